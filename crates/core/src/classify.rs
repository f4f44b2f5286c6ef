//! Classification of raw persistence failures.
//!
//! Maps a [`PersistenceError`] onto the closed set of kinds callers act on.
//! Codes are PostgreSQL SQLSTATE values; classes are their first two
//! characters. The mapping is total: every input yields exactly one kind.

use crate::error::{Error, PersistenceError};

/// `unique_violation`
pub const UNIQUE_VIOLATION: &str = "23505";

/// Class 08: connection exception.
const CONNECTION_EXCEPTION_CLASS: &str = "08";
/// Class 22: data exception.
const DATA_EXCEPTION_CLASS: &str = "22";
/// Class 23: integrity constraint violation.
const INTEGRITY_CONSTRAINT_CLASS: &str = "23";

/// Classify an error. Raw persistence failures are mapped to their kind;
/// every other error is returned unchanged.
pub fn classify(err: Error) -> Error {
    match err {
        Error::Persistence(raw) => classify_persistence(&raw),
        other => other,
    }
}

/// Map one raw persistence failure to its classified error.
pub fn classify_persistence(raw: &PersistenceError) -> Error {
    match raw {
        PersistenceError::NoRows => Error::NotFound("no matching record".into()),
        PersistenceError::Connection(reason) => Error::PersistenceUnavailable(format!(
            "Database connection error, please try again later. reason={reason}"
        )),
        PersistenceError::Other(reason) => {
            Error::PersistenceInternal(format!("Unhandled database error. reason={reason}"))
        }
        PersistenceError::Database { code, message } => {
            let code = code.as_deref().unwrap_or_default();
            if code == UNIQUE_VIOLATION {
                Error::Conflict(format!(
                    "Cannot insert new record. code={code}, message={message}"
                ))
            } else if code.starts_with(CONNECTION_EXCEPTION_CLASS) {
                Error::PersistenceUnavailable(format!(
                    "Database connection error, please try again later. code={code}, message={message}"
                ))
            } else if code.starts_with(DATA_EXCEPTION_CLASS)
                || code.starts_with(INTEGRITY_CONSTRAINT_CLASS)
            {
                Error::PersistenceInvalidInput(format!(
                    "Failure processing request. code={code}, message={message}"
                ))
            } else {
                Error::PersistenceInternal(format!(
                    "Unhandled database error. code={code}, message={message}"
                ))
            }
        }
    }
}
