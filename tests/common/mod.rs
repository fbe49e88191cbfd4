//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::net::TcpListener;

use exgen_gateway::config::GatewayConfig;
use exgen_gateway::http::HttpServer;
use exgen_gateway::lifecycle::Shutdown;
use exgen_gateway::observability::{EventSink, MemorySink};

/// What the echo backend saw.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

#[derive(Default)]
pub struct BackendState {
    pub role_calls: AtomicUsize,
}

pub struct Backend {
    pub addr: SocketAddr,
    pub state: Arc<BackendState>,
}

impl Backend {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn role_calls(&self) -> usize {
        self.state.role_calls.load(Ordering::SeqCst)
    }
}

/// Start an in-process backend on an ephemeral port.
///
/// - `/api/v1/user/role`: role for the bearer token, counted
/// - `/api/v1/slow`: answers after two seconds
/// - `/api/v1/missing`: 404 with a custom header
/// - anything else: echoes method, path, query, headers and body as JSON
pub async fn start_echo_backend() -> Backend {
    let state = Arc::new(BackendState::default());
    let app = Router::new()
        .route("/api/v1/user/role", get(role))
        .route("/api/v1/slow", get(slow))
        .route("/api/v1/missing", get(missing))
        .fallback(echo)
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Backend { addr, state }
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    let headers = headers
        .iter()
        .map(|(k, v)| (k.to_string(), String::from_utf8_lossy(v.as_bytes()).into_owned()))
        .collect();
    Json(Echo {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

async fn role(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> impl IntoResponse {
    state.role_calls.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(50)).await;

    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or_default()
        .to_string();

    match token.as_str() {
        "" | "expired" => (StatusCode::UNAUTHORIZED, Json(json!({"detail": "unauthorized"}))),
        _ => (
            StatusCode::OK,
            Json(json!({
                "user_id": format!("user_{token}"),
                "role": "admin",
                "first_name": "Ada",
                "last_name": null
            })),
        ),
    }
}

async fn slow() -> &'static str {
    tokio::time::sleep(Duration::from_secs(2)).await;
    "finally"
}

async fn missing() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        [("x-backend-trace", "t-1")],
        Json(json!({"detail": "no such job"})),
    )
}

pub struct Gateway {
    pub addr: SocketAddr,
    pub sink: Arc<MemorySink>,
    pub shutdown: Shutdown,
}

impl Gateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start the gateway on an ephemeral port in front of `backend_url`.
pub async fn start_gateway(backend_url: &str, configure: impl FnOnce(&mut GatewayConfig)) -> Gateway {
    let mut config = GatewayConfig::default();
    config.backend.base_url = backend_url.to_string();
    config.named_proxy.bearer_token = "frontend-secret-key".to_string();
    configure(&mut config);

    let sink = Arc::new(MemorySink::new());
    let server = HttpServer::with_sink(config, sink.clone() as Arc<dyn EventSink>).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    Gateway { addr, sink, shutdown }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// An address nothing listens on.
pub fn unused_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}
