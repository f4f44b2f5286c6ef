//! Error types for the Spacedock domain.
//!
//! Uses `thiserror` for ergonomic error definitions. The top-level [`Error`]
//! carries the classified kinds callers act on; [`PersistenceError`] and
//! [`RemoteError`] are the raw failures produced by the store and the remote
//! client before classification.

use thiserror::Error;

/// The top-level error type for all Spacedock operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Classified kinds ---
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Remote service unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("Remote protocol error: {0}")]
    RemoteProtocol(String),

    #[error("Database unavailable: {0}")]
    PersistenceUnavailable(String),

    #[error("Database rejected input: {0}")]
    PersistenceInvalidInput(String),

    #[error("Database error: {0}")]
    PersistenceInternal(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    // --- Raw persistence failure, not yet classified ---
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// The closed set of error categories exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Conflict,
    NotFound,
    RemoteUnavailable,
    RemoteProtocol,
    PersistenceUnavailable,
    PersistenceInvalidInput,
    PersistenceInternal,
    NotImplemented,
    Internal,
}

impl ErrorKind {
    /// Stable snake_case identifier used in API error bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Conflict => "conflict",
            Self::NotFound => "not_found",
            Self::RemoteUnavailable => "remote_unavailable",
            Self::RemoteProtocol => "remote_protocol",
            Self::PersistenceUnavailable => "persistence_unavailable",
            Self::PersistenceInvalidInput => "persistence_invalid_input",
            Self::PersistenceInternal => "persistence_internal",
            Self::NotImplemented => "not_implemented",
            Self::Internal => "internal",
        }
    }

    /// Whether the same request may succeed after a backoff.
    ///
    /// Nothing in Spacedock retries on its own; this is advice for callers.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RemoteUnavailable | Self::PersistenceUnavailable)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// The category of this error. Raw persistence failures report the kind
    /// they classify to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::RemoteUnavailable(_) => ErrorKind::RemoteUnavailable,
            Self::RemoteProtocol(_) => ErrorKind::RemoteProtocol,
            Self::PersistenceUnavailable(_) => ErrorKind::PersistenceUnavailable,
            Self::PersistenceInvalidInput(_) => ErrorKind::PersistenceInvalidInput,
            Self::PersistenceInternal(_) => ErrorKind::PersistenceInternal,
            Self::NotImplemented(_) => ErrorKind::NotImplemented,
            Self::Persistence(raw) => crate::classify::classify_persistence(raw).kind(),
            Self::Config { .. } | Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

// --- Bounded context errors ---

/// A raw failure from the agent store.
///
/// `NoRows` is kept apart from every other failure so lookups can be
/// reported as not found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    #[error("no rows returned")]
    NoRows,

    /// The database answered with an error; `code` is the SQLSTATE.
    #[error("database error code={}: {message}", .code.as_deref().unwrap_or("unknown"))]
    Database {
        code: Option<String>,
        message: String,
    },

    /// The database could not be reached (pool timeout, I/O, TLS, closed pool).
    #[error("connection failure: {0}")]
    Connection(String),

    #[error("{0}")]
    Other(String),
}

impl PersistenceError {
    pub fn database(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Database {
            code: Some(code.into()),
            message: message.into(),
        }
    }
}

/// A failure talking to the remote game service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// No response was received.
    #[error("{operation} request failed: {reason}")]
    Transport {
        operation: &'static str,
        reason: String,
    },

    /// A response was received with a status outside the expected set.
    #[error("{operation} returned status {status}: {body}")]
    Status {
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// A response was received but its body was not the documented shape.
    #[error("{operation} returned an unreadable body: {reason}")]
    Decode {
        operation: &'static str,
        reason: String,
    },
}

impl From<RemoteError> for Error {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Transport { .. } => Error::RemoteUnavailable(err.to_string()),
            RemoteError::Status { .. } | RemoteError::Decode { .. } => {
                Error::RemoteProtocol(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_error_displays_code() {
        let err = PersistenceError::database("23505", "duplicate key value");
        assert!(err.to_string().contains("code=23505"));
        assert!(err.to_string().contains("duplicate key"));
    }

    #[test]
    fn database_error_without_code_displays_unknown() {
        let err = PersistenceError::Database {
            code: None,
            message: "boom".into(),
        };
        assert!(err.to_string().contains("code=unknown"));
    }

    #[test]
    fn transport_failure_is_remote_unavailable() {
        let err: Error = RemoteError::Transport {
            operation: "get_status",
            reason: "connection refused".into(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::RemoteUnavailable);
        assert!(err.kind().is_retryable());
    }

    #[test]
    fn unexpected_status_is_remote_protocol() {
        let err: Error = RemoteError::Status {
            operation: "register",
            status: 400,
            body: "bad faction".into(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::RemoteProtocol);
        assert!(err.to_string().contains("400"));
        assert!(!err.kind().is_retryable());
    }

    #[test]
    fn raw_persistence_error_reports_classified_kind() {
        let err = Error::Persistence(PersistenceError::NoRows);
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn kind_identifiers_are_snake_case() {
        assert_eq!(ErrorKind::PersistenceInvalidInput.as_str(), "persistence_invalid_input");
        assert_eq!(ErrorKind::NotImplemented.to_string(), "not_implemented");
    }
}
