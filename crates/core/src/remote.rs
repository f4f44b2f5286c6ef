//! GameClient trait: the abstraction over the remote SpaceTraders API.
//!
//! Payload types mirror the documented v2 response shapes (camelCase on the
//! wire). Only the fields the reconciler reads are required; the rest are
//! defaulted so that additive API changes do not break decoding.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RemoteError;

/// Server status, as returned by the status endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStatus {
    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub reset_date: String,

    pub server_resets: ServerResets,
}

/// The reset schedule of the game universe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerResets {
    /// RFC3339 timestamp of the next reset.
    pub next: String,

    #[serde(default)]
    pub frequency: String,
}

/// An agent as the remote service reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteAgent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,

    pub symbol: String,

    pub headquarters: String,

    pub credits: i64,

    #[serde(default)]
    pub starting_faction: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ship_count: Option<u32>,
}

/// Outcome of looking an agent up by symbol.
#[derive(Debug, Clone)]
pub enum AgentLookup {
    Found(RemoteAgent),
    NotFound,
}

/// Body of a registration call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub faction: String,
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// A faction as embedded in a registration response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Faction {
    #[serde(default)]
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub headquarters: String,
}

/// A successful registration. The issued agent token is not retained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    pub agent: RemoteAgent,
    pub faction: Faction,
}

/// The remote game service.
///
/// Implementations perform exactly one HTTP exchange per call and never
/// retry; retry policy belongs to the caller.
#[async_trait]
pub trait GameClient: Send + Sync {
    /// The client name (e.g., "spacetraders").
    fn name(&self) -> &str;

    /// Fetch the server status, including the next reset time.
    async fn status(&self) -> Result<ServerStatus, RemoteError>;

    /// Look an agent up by symbol. A 404 is `Ok(AgentLookup::NotFound)`.
    async fn agent(&self, symbol: &str) -> Result<AgentLookup, RemoteError>;

    /// Register a new agent.
    async fn register(&self, request: RegisterRequest) -> Result<Registration, RemoteError>;
}
