//! AgentStore trait: persistence of agent records.
//!
//! Implementations return raw [`PersistenceError`] values; classification
//! into caller-facing kinds happens in the reconciler via
//! [`crate::classify`].

use async_trait::async_trait;

use crate::agent::Agent;
use crate::error::PersistenceError;

/// The core AgentStore trait.
///
/// Implementations: PostgreSQL, in-memory (for testing).
#[async_trait]
pub trait AgentStore: Send + Sync {
    /// The backend name (e.g., "postgres", "in_memory").
    fn name(&self) -> &str;

    /// Insert a new agent and return the stored row.
    ///
    /// A duplicate call sign must fail with a unique-violation
    /// (`23505`) database error.
    async fn insert(&self, agent: Agent) -> Result<Agent, PersistenceError>;

    /// Fetch one agent. A missing row is `PersistenceError::NoRows`.
    async fn get_by_call_sign(&self, call_sign: &str) -> Result<Agent, PersistenceError>;

    /// All agents, ordered by call sign ascending.
    async fn list(&self) -> Result<Vec<Agent>, PersistenceError>;
}
