//! HTTP gateway for Spacedock.
//!
//! Exposes the agent API, a health check and the landing page.
//!
//! Built on Axum. Layers applied to every route:
//! - `x-request-id` assigned when absent, echoed on the response and
//!   recorded on the request's trace span
//! - HTTP trace logging
//! - panics in handlers turned into a 500 JSON error
//! - a request timeout; when it fires the handler future is dropped,
//!   cancelling any in-flight remote or database call, and the client
//!   receives 408

pub mod api;
pub mod frontend;

use axum::{
    Router,
    extract::Request,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use serde::Serialize;
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, info_span};

use spacedock_agent::AgentReconciler;
use spacedock_config::AppConfig;
use spacedock_remote::SpaceTradersClient;
use spacedock_store::PostgresStore;

/// Header carrying the per-request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Build the full router: API routes, health check and landing page.
pub fn build_router(state: api::SharedApiState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .merge(api::api_router(state))
        .merge(frontend::frontend_router())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

fn request_span(request: &Request) -> tracing::Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}

/// Answer a handler panic with the regular JSON error body.
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(panic = %detail, "Handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(api::ErrorResponse {
            error: spacedock_core::ErrorKind::Internal.as_str(),
            message: "Internal error: request handler panicked".into(),
        }),
    )
        .into_response()
}

/// Build the reconciler from configuration and an already-connected store.
pub fn build_reconciler(
    config: &AppConfig,
    store: Arc<PostgresStore>,
) -> Result<AgentReconciler, spacedock_core::Error> {
    let client = SpaceTradersClient::from_config(&config.space_traders)?;

    Ok(AgentReconciler::new(Arc::new(client), store).with_registration(
        config.space_traders.register_faction.clone(),
        config.space_traders.register_email.clone(),
    ))
}

/// Start the gateway HTTP server.
///
/// Connects the pool, applies the schema, then serves until Ctrl-C. In-flight
/// requests are allowed to finish before the pool is closed.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let store = Arc::new(
        PostgresStore::connect(config.database_url()?, config.database.max_connections).await?,
    );
    store.migrate().await?;

    let reconciler = build_reconciler(&config, store.clone())?;
    let state = Arc::new(api::ApiState {
        reconciler: Arc::new(reconciler),
    });
    let app = build_router(
        state,
        Duration::from_secs(config.gateway.request_timeout_secs),
    );

    info!(
        addr = %addr,
        remote = %config.space_traders.base_url,
        request_timeout_secs = config.gateway.request_timeout_secs,
        "Gateway starting"
    );
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received, draining connections"),
        Err(e) => {
            error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    }
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
