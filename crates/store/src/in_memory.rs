//! In-memory store: useful for testing and ephemeral sessions.

use async_trait::async_trait;
use spacedock_core::agent::Agent;
use spacedock_core::classify::UNIQUE_VIOLATION;
use spacedock_core::error::PersistenceError;
use spacedock_core::store::AgentStore;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// An in-memory store keyed by call sign.
///
/// Duplicate inserts fail with the same SQLSTATE the PostgreSQL backend
/// reports, so classification behaves identically.
pub struct InMemoryStore {
    agents: Arc<RwLock<BTreeMap<String, Agent>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            agents: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AgentStore for InMemoryStore {
    fn name(&self) -> &str { "in_memory" }

    async fn insert(&self, agent: Agent) -> Result<Agent, PersistenceError> {
        let mut agents = self.agents.write().await;
        if agents.contains_key(&agent.call_sign) {
            return Err(PersistenceError::database(
                UNIQUE_VIOLATION,
                format!(
                    "duplicate key value violates unique constraint \"spacetraders_agent_pkey\" (call_sign={})",
                    agent.call_sign
                ),
            ));
        }
        agents.insert(agent.call_sign.clone(), agent.clone());
        Ok(agent)
    }

    async fn get_by_call_sign(&self, call_sign: &str) -> Result<Agent, PersistenceError> {
        self.agents
            .read()
            .await
            .get(call_sign)
            .cloned()
            .ok_or(PersistenceError::NoRows)
    }

    async fn list(&self) -> Result<Vec<Agent>, PersistenceError> {
        // BTreeMap iteration is byte-wise call-sign ascending.
        Ok(self.agents.read().await.values().cloned().collect())
    }
}
