//! SpaceTraders v2 API client.
//!
//! Exposes the three calls the reconciler needs:
//! - server status (next reset time)
//! - agent lookup by symbol
//! - agent registration
//!
//! Every request carries the configured bearer token and is bounded by the
//! client timeout (30s by default). No retries are attempted here.

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use spacedock_config::SpaceTradersConfig;
use spacedock_core::error::{Error, RemoteError};
use spacedock_core::remote::*;
use std::time::Duration;
use tracing::{debug, warn};

const OP_STATUS: &str = "get_status";
const OP_AGENT: &str = "get_agent";
const OP_REGISTER: &str = "register";

/// Most resource endpoints wrap their payload in `{"data": ...}`.
#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

/// A SpaceTraders API client.
pub struct SpaceTradersClient {
    base_url: Url,
    status_path: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl SpaceTradersClient {
    /// Create a client against `base_url` with the given request timeout.
    pub fn new(
        base_url: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, Error> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| Error::Config {
                message: format!("invalid SpaceTraders base URL {base_url:?}: {e}"),
            })?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config {
                message: format!("SpaceTraders base URL {base_url} cannot carry a path"),
            });
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            base_url,
            status_path: "/status".into(),
            token,
            client,
        })
    }

    /// Build a client from the `[space_traders]` configuration section.
    pub fn from_config(config: &SpaceTradersConfig) -> Result<Self, Error> {
        Ok(Self::new(
            &config.base_url,
            config.token.clone(),
            Duration::from_secs(config.timeout_secs),
        )?
        .with_status_path(&config.status_path))
    }

    /// Override the status endpoint path (the public API serves it at `/`).
    pub fn with_status_path(mut self, path: &str) -> Self {
        self.status_path = path.to_string();
        self
    }

    /// Base URL with `segments` appended, each percent-encoded.
    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.base_url.clone();
        // Checked in `new`: the base URL can carry a path.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            path.extend(segments.into_iter().filter(|s| !s.is_empty()));
        }
        url
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => builder.header("Authorization", format!("Bearer {token}")),
            None => builder,
        }
    }

    async fn send(
        &self,
        operation: &'static str,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, RemoteError> {
        self.authorized(builder)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| RemoteError::Transport {
                operation,
                reason: if e.is_timeout() {
                    format!("timed out: {e}")
                } else {
                    e.to_string()
                },
            })
    }
}

/// Turn a response with an unexpected status into an error, keeping the body
/// for diagnostics.
async fn unexpected_status(operation: &'static str, response: reqwest::Response) -> RemoteError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    warn!(operation, status, body = %body, "SpaceTraders returned unexpected status");
    RemoteError::Status {
        operation,
        status,
        body,
    }
}

async fn decode<T: DeserializeOwned>(
    operation: &'static str,
    response: reqwest::Response,
) -> Result<T, RemoteError> {
    response.json::<T>().await.map_err(|e| RemoteError::Decode {
        operation,
        reason: e.to_string(),
    })
}

#[async_trait]
impl GameClient for SpaceTradersClient {
    fn name(&self) -> &str {
        "spacetraders"
    }

    async fn status(&self) -> Result<ServerStatus, RemoteError> {
        let url = self.endpoint(self.status_path.split('/'));
        debug!(url = %url, "Fetching server status");

        let response = self.send(OP_STATUS, self.client.get(url)).await?;
        if response.status() != StatusCode::OK {
            return Err(unexpected_status(OP_STATUS, response).await);
        }
        decode(OP_STATUS, response).await
    }

    async fn agent(&self, symbol: &str) -> Result<AgentLookup, RemoteError> {
        let url = self.endpoint(["agents", symbol]);
        debug!(url = %url, symbol, "Looking up remote agent");

        let response = self.send(OP_AGENT, self.client.get(url)).await?;
        match response.status() {
            StatusCode::OK => {
                let envelope: Envelope<RemoteAgent> = decode(OP_AGENT, response).await?;
                Ok(AgentLookup::Found(envelope.data))
            }
            StatusCode::NOT_FOUND => Ok(AgentLookup::NotFound),
            _ => Err(unexpected_status(OP_AGENT, response).await),
        }
    }

    async fn register(&self, request: RegisterRequest) -> Result<Registration, RemoteError> {
        let url = self.endpoint(["register"]);
        debug!(url = %url, symbol = %request.symbol, faction = %request.faction, "Registering agent");

        let response = self
            .send(OP_REGISTER, self.client.post(url).json(&request))
            .await?;
        if response.status() != StatusCode::CREATED {
            return Err(unexpected_status(OP_REGISTER, response).await);
        }
        let envelope: Envelope<Registration> = decode(OP_REGISTER, response).await?;
        Ok(envelope.data)
    }
}
