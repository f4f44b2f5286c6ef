//! End-to-end integration tests for Spacedock.
//!
//! These tests run the real SpaceTraders client against a local stand-in for
//! the game API and drive the full gateway router: HTTP request in, remote
//! calls and store writes in the middle, JSON response out.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use spacedock_agent::AgentReconciler;
use spacedock_config::AppConfig;
use spacedock_gateway::api::ApiState;
use spacedock_remote::SpaceTradersClient;
use spacedock_store::InMemoryStore;

// ── Game stand-in ────────────────────────────────────────────────────────

/// Records what the gateway asked of the game.
#[derive(Default)]
struct GameState {
    known: Mutex<HashSet<String>>,
    registrations: Mutex<usize>,
    status_calls: Mutex<usize>,
    auth_headers: Mutex<Vec<String>>,
}

impl GameState {
    fn with_known(symbols: &[&str]) -> Self {
        let state = Self::default();
        state
            .known
            .lock()
            .unwrap()
            .extend(symbols.iter().map(|s| s.to_string()));
        state
    }

    fn registrations(&self) -> usize {
        *self.registrations.lock().unwrap()
    }

    fn status_calls(&self) -> usize {
        *self.status_calls.lock().unwrap()
    }

    fn record_auth(&self, headers: &HeaderMap) {
        if let Some(value) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
            self.auth_headers.lock().unwrap().push(value.to_string());
        }
    }
}

fn remote_agent(symbol: &str) -> Value {
    json!({
        "accountId": "acc-e2e",
        "symbol": symbol,
        "headquarters": "X1-DF55-20250Z",
        "credits": 175000,
        "startingFaction": "COSMIC",
        "shipCount": 2
    })
}

async fn status_handler(State(game): State<Arc<GameState>>, headers: HeaderMap) -> Json<Value> {
    game.record_auth(&headers);
    *game.status_calls.lock().unwrap() += 1;
    Json(json!({
        "status": "SpaceTraders is currently online and available to play",
        "version": "v2.1.4",
        "resetDate": "2026-10-11",
        "serverResets": {"next": "2026-10-25T16:00:00.000Z", "frequency": "fortnightly"}
    }))
}

async fn agent_handler(
    State(game): State<Arc<GameState>>,
    Path(symbol): Path<String>,
    headers: HeaderMap,
) -> Response {
    game.record_auth(&headers);
    if game.known.lock().unwrap().contains(&symbol) {
        Json(json!({"data": remote_agent(&symbol)})).into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({"error": {"message": "Agent not found", "code": 404}})),
        )
            .into_response()
    }
}

async fn register_handler(
    State(game): State<Arc<GameState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    game.record_auth(&headers);
    let symbol = body["symbol"].as_str().unwrap_or_default().to_string();
    *game.registrations.lock().unwrap() += 1;
    game.known.lock().unwrap().insert(symbol.clone());

    (
        StatusCode::CREATED,
        Json(json!({
            "data": {
                "agent": remote_agent(&symbol),
                "faction": {
                    "symbol": body["faction"],
                    "name": "Cosmic Engineers",
                    "headquarters": "X1-DF55"
                },
                "token": "issued-token"
            }
        })),
    )
        .into_response()
}

/// Serve the stand-in on an ephemeral port and return its API base URL.
async fn spawn_game(game: Arc<GameState>) -> String {
    let router = Router::new()
        .route("/v2/status", get(status_handler))
        .route("/v2/agents/{symbol}", get(agent_handler))
        .route("/v2/register", post(register_handler))
        .with_state(game);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/v2")
}

// ── Helpers ──────────────────────────────────────────────────────────────

fn gateway(base_url: &str, store: Arc<InMemoryStore>) -> Router {
    let client = SpaceTradersClient::new(base_url, Some("e2e-token".into()), Duration::from_secs(5))
        .unwrap();
    let reconciler = AgentReconciler::new(Arc::new(client), store)
        .with_registration("COSMIC", Some("ops@example.com".into()));

    spacedock_gateway::build_router(
        Arc::new(ApiState {
            reconciler: Arc::new(reconciler),
        }),
        Duration::from_secs(60),
    )
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn get_req(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_req(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// ── E2E: Create / Get / List ─────────────────────────────────────────────

#[tokio::test]
async fn e2e_create_derives_expiry_from_server_reset() {
    let game = Arc::new(GameState::default());
    let base = spawn_game(game.clone()).await;
    let app = gateway(&base, Arc::new(InMemoryStore::new()));

    let (status, created) = send(
        &app,
        post_req(
            "/agents",
            json!({"callSign": "ZEPHYR", "faction": "COSMIC", "headquarters": "X1-DF55-20250Z"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["credits"], 0);
    assert_eq!(created["expiresOn"], "2026-10-25");
    assert_eq!(game.status_calls(), 1);

    let (status, fetched) = send(&app, get_req("/agents/ZEPHYR")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn e2e_create_with_expiry_never_calls_game() {
    let game = Arc::new(GameState::default());
    let base = spawn_game(game.clone()).await;
    let app = gateway(&base, Arc::new(InMemoryStore::new()));

    let (status, created) = send(
        &app,
        post_req(
            "/agents",
            json!({
                "callSign": "ZEPHYR",
                "faction": "COSMIC",
                "headquarters": "X1-DF55-20250Z",
                "credits": 2500,
                "expiresOn": "2026-12-31"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["credits"], 2500);
    assert_eq!(created["expiresOn"], "2026-12-31");
    assert_eq!(game.status_calls(), 0);
}

#[tokio::test]
async fn e2e_duplicate_create_conflicts_and_list_is_sorted() {
    let game = Arc::new(GameState::default());
    let base = spawn_game(game).await;
    let app = gateway(&base, Arc::new(InMemoryStore::new()));

    for sign in ["C", "A", "B"] {
        let (status, _) = send(
            &app,
            post_req(
                "/agents",
                json!({"callSign": sign, "faction": "COSMIC", "headquarters": "HQ", "expiresOn": "2026-11-01"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(
        &app,
        post_req(
            "/agents",
            json!({"callSign": "A", "faction": "VOID", "headquarters": "ELSEWHERE", "expiresOn": "2027-01-01"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    let (status, list) = send(&app, get_req("/agents")).await;
    assert_eq!(status, StatusCode::OK);
    let agents = list.as_array().unwrap();
    let signs: Vec<&str> = agents.iter().map(|a| a["callSign"].as_str().unwrap()).collect();
    assert_eq!(signs, vec!["A", "B", "C"]);
    assert_eq!(agents[0]["faction"], "COSMIC");
}

// ── E2E: Refresh ─────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_refresh_registers_once_then_reads_locally() {
    let game = Arc::new(GameState::default());
    let base = spawn_game(game.clone()).await;
    let app = gateway(&base, Arc::new(InMemoryStore::new()));

    let (status, first) = send(&app, get_req("/agents/NEWSIGN/refresh")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["callSign"], "NEWSIGN");
    assert_eq!(first["faction"], "Cosmic Engineers");
    assert_eq!(first["headquarters"], "X1-DF55-20250Z");
    assert_eq!(first["credits"], 175000);
    assert_eq!(first["expiresOn"], "2026-10-25");
    assert_eq!(game.registrations(), 1);

    // The game now knows the agent: no second registration, same record.
    let (status, second) = send(&app, get_req("/agents/NEWSIGN/refresh")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second, first);
    assert_eq!(game.registrations(), 1);

    let (_, list) = send(&app, get_req("/agents")).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn e2e_refresh_of_remote_only_agent_is_not_found() {
    let game = Arc::new(GameState::with_known(&["VETERAN"]));
    let base = spawn_game(game.clone()).await;
    let app = gateway(&base, Arc::new(InMemoryStore::new()));

    let (status, body) = send(&app, get_req("/agents/VETERAN/refresh")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
    assert!(body["message"].as_str().unwrap().contains("VETERAN"));
    assert_eq!(game.registrations(), 0);
}

#[tokio::test]
async fn e2e_game_receives_bearer_token() {
    let game = Arc::new(GameState::default());
    let base = spawn_game(game.clone()).await;
    let app = gateway(&base, Arc::new(InMemoryStore::new()));

    let (status, _) = send(&app, get_req("/agents/NEWSIGN/refresh")).await;
    assert_eq!(status, StatusCode::OK);

    let headers = game.auth_headers.lock().unwrap().clone();
    assert!(!headers.is_empty());
    assert!(headers.iter().all(|h| h == "Bearer e2e-token"));
}

#[tokio::test]
async fn e2e_unreachable_game_is_bad_gateway() {
    // Reserve a port, then release it so nothing is listening there.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let app = gateway(&format!("http://{addr}/v2"), Arc::new(InMemoryStore::new()));

    let (status, body) = send(&app, get_req("/agents/ZEPHYR/refresh")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "remote_unavailable");

    let (status, _) = send(
        &app,
        post_req(
            "/agents",
            json!({"callSign": "ZEPHYR", "faction": "COSMIC", "headquarters": "HQ"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    let (_, list) = send(&app, get_req("/agents")).await;
    assert!(list.as_array().unwrap().is_empty());
}

// ── E2E: Configuration ───────────────────────────────────────────────────

#[tokio::test]
async fn e2e_config_defaults_and_overrides() {
    let mut config = AppConfig::default();

    assert_eq!(config.gateway.port, 8080);
    assert_eq!(config.gateway.request_timeout_secs, 60);
    assert_eq!(config.space_traders.timeout_secs, 30);
    assert_eq!(config.space_traders.register_faction, "COSMIC");
    assert_eq!(config.database.max_connections, 10);

    config
        .apply_env(|key| match key {
            "DATABASE_URL" => Some("postgres://localhost/spacedock".into()),
            "AGENT_TOKEN" => Some("secret".into()),
            "SPACEDOCK_PORT" => Some("9191".into()),
            _ => None,
        })
        .unwrap();
    assert_eq!(config.database_url().unwrap(), "postgres://localhost/spacedock");
    assert_eq!(config.gateway.port, 9191);

    let rendered = format!("{config:?}");
    assert!(!rendered.contains("secret"));

    // The gateway can be wired from this configuration without a database.
    let client = SpaceTradersClient::from_config(&config.space_traders);
    assert!(client.is_ok());

    let toml_str = toml::to_string_pretty(&config).unwrap();
    let reparsed: AppConfig = toml::from_str(&toml_str).unwrap();
    assert_eq!(reparsed.gateway.port, 9191);
    assert_eq!(reparsed.space_traders.status_path, config.space_traders.status_path);
}
