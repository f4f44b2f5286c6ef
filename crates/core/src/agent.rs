//! Agent records and creation requests.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A locally persisted agent, mirroring an account on the remote game.
///
/// `call_sign` is the primary key and matches the remote "symbol".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub call_sign: String,
    pub faction: String,
    pub headquarters: String,
    pub credits: i32,
    /// Serialized as `YYYY-MM-DD`.
    pub expires_on: NaiveDate,
}

/// Inbound request for creating an agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAgentRequest {
    pub call_sign: String,
    pub faction: String,
    pub headquarters: String,

    /// Defaults to 0 when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credits: Option<i32>,

    /// Derived from the next server reset when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_on: Option<NaiveDate>,
}

impl CreateAgentRequest {
    pub fn new(
        call_sign: impl Into<String>,
        faction: impl Into<String>,
        headquarters: impl Into<String>,
    ) -> Self {
        Self {
            call_sign: call_sign.into(),
            faction: faction.into(),
            headquarters: headquarters.into(),
            credits: None,
            expires_on: None,
        }
    }

    pub fn with_credits(mut self, credits: i32) -> Self {
        self.credits = Some(credits);
        self
    }

    pub fn with_expires_on(mut self, expires_on: NaiveDate) -> Self {
        self.expires_on = Some(expires_on);
        self
    }

    /// Reject blank required fields before any remote call or write happens.
    pub fn validate(&self) -> Result<()> {
        if self.call_sign.trim().is_empty() {
            return Err(Error::Validation("callSign must not be empty".into()));
        }
        if self.faction.trim().is_empty() {
            return Err(Error::Validation("faction must not be empty".into()));
        }
        if self.headquarters.trim().is_empty() {
            return Err(Error::Validation("headquarters must not be empty".into()));
        }
        Ok(())
    }
}
