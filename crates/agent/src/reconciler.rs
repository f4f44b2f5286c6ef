//! Agent reconciliation between the remote game and the local store.

use chrono::{DateTime, NaiveDate};
use spacedock_core::agent::{Agent, CreateAgentRequest};
use spacedock_core::classify::classify;
use spacedock_core::error::{Error, PersistenceError, Result};
use spacedock_core::remote::{AgentLookup, GameClient, RegisterRequest};
use spacedock_core::store::AgentStore;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Faction used when registering agents that are unknown to the remote game.
pub const DEFAULT_REGISTER_FACTION: &str = "COSMIC";

/// Creates, fetches and refreshes local agents against the remote game.
///
/// Holds no mutable state; concurrent calls are safe and races on the same
/// call sign are settled by the store's unique constraint.
pub struct AgentReconciler {
    /// The remote game service
    client: Arc<dyn GameClient>,

    /// Local agent persistence
    store: Arc<dyn AgentStore>,

    /// Faction sent with registrations
    register_faction: String,

    /// Contact email sent with registrations
    register_email: Option<String>,
}

impl AgentReconciler {
    /// Create a new reconciler.
    pub fn new(client: Arc<dyn GameClient>, store: Arc<dyn AgentStore>) -> Self {
        Self {
            client,
            store,
            register_faction: DEFAULT_REGISTER_FACTION.into(),
            register_email: None,
        }
    }

    /// Set the faction and contact email used when a refresh registers a new agent.
    pub fn with_registration(
        mut self,
        faction: impl Into<String>,
        email: Option<String>,
    ) -> Self {
        self.register_faction = faction.into();
        self.register_email = email;
        self
    }

    /// Create and persist an agent.
    ///
    /// Missing `credits` default to 0. A missing `expires_on` is derived from
    /// the remote server's next reset, costing exactly one status call.
    pub async fn create(&self, request: CreateAgentRequest) -> Result<Agent> {
        request.validate()?;

        let expires_on = match request.expires_on {
            Some(date) => date,
            None => self.next_reset_date().await?,
        };

        let agent = Agent {
            call_sign: request.call_sign,
            faction: request.faction,
            headquarters: request.headquarters,
            credits: request.credits.unwrap_or(0),
            expires_on,
        };

        match self.store.insert(agent).await {
            Ok(stored) => {
                info!(call_sign = %stored.call_sign, expires_on = %stored.expires_on, "Agent created");
                Ok(stored)
            }
            Err(e) => {
                let err = classify(e.into());
                warn!(kind = %err.kind(), error = %err, "Agent insert failed");
                Err(err)
            }
        }
    }

    /// Fetch a stored agent by call sign.
    pub async fn get_by_call_sign(&self, call_sign: &str) -> Result<Agent> {
        self.store
            .get_by_call_sign(call_sign)
            .await
            .map_err(|e| match e {
                PersistenceError::NoRows => {
                    Error::NotFound(format!("no agent with call sign {call_sign}"))
                }
                other => classify(other.into()),
            })
    }

    /// All stored agents, ordered by call sign ascending.
    pub async fn list_agents(&self) -> Result<Vec<Agent>> {
        self.store.list().await.map_err(|e| classify(e.into()))
    }

    /// Bring the local record for `call_sign` in line with the remote game.
    ///
    /// - remote has no such agent: register it remotely, then create it
    ///   locally from the registration
    /// - remote knows the agent: return the local record without writing
    ///
    /// A remotely known agent with no local record is `NotFound`; refresh
    /// never creates a record from a remote lookup alone.
    pub async fn refresh_by_call_sign(&self, call_sign: &str) -> Result<Agent> {
        if call_sign.trim().is_empty() {
            return Err(Error::Validation("callSign must not be empty".into()));
        }

        match self.client.agent(call_sign).await? {
            AgentLookup::NotFound => {
                info!(call_sign, "Agent unknown to remote, registering");
                self.register_and_create(call_sign).await
            }
            AgentLookup::Found(remote) => {
                debug!(call_sign, remote_symbol = %remote.symbol, "Agent found remotely");
                self.store
                    .get_by_call_sign(&remote.symbol)
                    .await
                    .map_err(|e| match e {
                        PersistenceError::NoRows => Error::NotFound(format!(
                            "agent {} exists on the remote service but has no local record",
                            remote.symbol
                        )),
                        other => classify(other.into()),
                    })
            }
        }
    }

    async fn register_and_create(&self, call_sign: &str) -> Result<Agent> {
        let registration = self
            .client
            .register(RegisterRequest {
                faction: self.register_faction.clone(),
                symbol: call_sign.to_string(),
                email: self.register_email.clone(),
            })
            .await?;

        let credits = i32::try_from(registration.agent.credits).map_err(|_| {
            Error::Validation(format!(
                "registered credits {} do not fit a 32-bit balance",
                registration.agent.credits
            ))
        })?;

        let request = CreateAgentRequest::new(
            call_sign,
            registration.faction.name,
            registration.agent.headquarters,
        )
        .with_credits(credits);

        self.create(request).await
    }

    /// Date of the next server reset, from the remote status endpoint.
    async fn next_reset_date(&self) -> Result<NaiveDate> {
        let status = self.client.status().await?;
        let next = &status.server_resets.next;

        let instant = DateTime::parse_from_rfc3339(next).map_err(|e| {
            Error::Validation(format!(
                "No expiresOn provided and unable to parse next reset time {next:?}: {e}"
            ))
        })?;

        // Calendar date in the timestamp's own offset.
        let date = instant.date_naive();
        debug!(next_reset = %next, expires_on = %date, "Derived expiry from server reset");
        Ok(date)
    }
}
