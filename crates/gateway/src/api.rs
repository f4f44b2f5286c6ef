//! Agent and ship API routes.
//!
//! Endpoints:
//! - POST /agents                       Create an agent
//! - GET  /agents                       List agents (call sign ascending)
//! - GET  /agents/{callSign}            Fetch one agent
//! - GET  /agents/{callSign}/refresh    Reconcile one agent with the game
//! - GET  /ships/{shipId}               Not implemented (501)

use axum::{
    Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
    routing::get,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, warn};

use spacedock_agent::AgentReconciler;
use spacedock_core::agent::{Agent, CreateAgentRequest};
use spacedock_core::error::{Error, ErrorKind};

/// Shared state for the API routes.
pub struct ApiState {
    pub reconciler: Arc<AgentReconciler>,
}

pub type SharedApiState = Arc<ApiState>;

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = Result<T, ApiError>;

/// HTTP status for each error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::RemoteUnavailable | ErrorKind::RemoteProtocol => StatusCode::BAD_GATEWAY,
        ErrorKind::PersistenceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::PersistenceInvalidInput => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::PersistenceInternal | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        ErrorKind::NotImplemented => StatusCode::NOT_IMPLEMENTED,
    }
}

fn error_response(err: Error) -> ApiError {
    let kind = err.kind();
    let status = status_for(kind);

    if status.is_server_error() {
        error!(kind = %kind, error = %err, "Request failed");
    } else {
        debug!(kind = %kind, error = %err, "Request rejected");
    }

    (
        status,
        Json(ErrorResponse {
            error: kind.as_str(),
            message: err.to_string(),
        }),
    )
}

/// Malformed bodies keep axum's status (400 or 422) but use our error shape.
fn rejection_response(rejection: JsonRejection) -> ApiError {
    warn!(error = %rejection.body_text(), "Rejected request body");
    (
        rejection.status(),
        Json(ErrorResponse {
            error: ErrorKind::Validation.as_str(),
            message: rejection.body_text(),
        }),
    )
}

/// Build the API router.
pub fn api_router(state: SharedApiState) -> Router {
    Router::new()
        .route("/agents", get(list_agents_handler).post(create_agent_handler))
        .route("/agents/{call_sign}", get(get_agent_handler))
        .route("/agents/{call_sign}/refresh", get(refresh_agent_handler))
        .route("/ships/{ship_id}", get(get_ship_handler))
        .with_state(state)
}

// ── Agents ──────────────────────────────────────────────────────────────────

async fn create_agent_handler(
    State(state): State<SharedApiState>,
    payload: Result<Json<CreateAgentRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Agent>)> {
    let Json(request) = payload.map_err(rejection_response)?;

    let agent = state
        .reconciler
        .create(request)
        .await
        .map_err(error_response)?;

    Ok((StatusCode::CREATED, Json(agent)))
}

async fn list_agents_handler(State(state): State<SharedApiState>) -> ApiResult<Json<Vec<Agent>>> {
    let agents = state.reconciler.list_agents().await.map_err(error_response)?;
    Ok(Json(agents))
}

async fn get_agent_handler(
    State(state): State<SharedApiState>,
    Path(call_sign): Path<String>,
) -> ApiResult<Json<Agent>> {
    state
        .reconciler
        .get_by_call_sign(&call_sign)
        .await
        .map(Json)
        .map_err(error_response)
}

async fn refresh_agent_handler(
    State(state): State<SharedApiState>,
    Path(call_sign): Path<String>,
) -> ApiResult<Json<Agent>> {
    state
        .reconciler
        .refresh_by_call_sign(&call_sign)
        .await
        .map(Json)
        .map_err(error_response)
}

// ── Ships ───────────────────────────────────────────────────────────────────

async fn get_ship_handler(Path(ship_id): Path<String>) -> ApiResult<Json<()>> {
    Err(error_response(Error::NotImplemented(format!(
        "ship lookup is not available yet (requested {ship_id})"
    ))))
}
