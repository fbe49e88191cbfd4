//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the catch-all, named proxy and liveness routes
//! - Wire up middleware (request ID, tracing, inbound timeout)
//! - Serve on a bound listener until shutdown is signalled

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::error_handling::HandleErrorLayer;
use axum::http::Request;
use axum::routing::{any, get};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::GatewayConfig;
use crate::error::{handle_middleware_error, ServerError};
use crate::http::request::{request_id, MakeRequestUuid, X_REQUEST_ID};
use crate::http::{gateway, proxy};
use crate::observability::{EventSink, TracingSink};
use crate::routing::Dispatcher;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    /// Catch-all prefix, stripped from the raw request path.
    pub path_prefix: Arc<str>,
    pub max_body_bytes: usize,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a server that reports through [`TracingSink`].
    pub fn new(config: GatewayConfig) -> Result<Self, ServerError> {
        Self::with_sink(config, Arc::new(TracingSink))
    }

    pub fn with_sink(config: GatewayConfig, sink: Arc<dyn EventSink>) -> Result<Self, ServerError> {
        let dispatcher = Dispatcher::from_config(&config, sink)?;
        let state = AppState {
            dispatcher: Arc::new(dispatcher),
            path_prefix: Arc::from(config.gateway.path_prefix.as_str()),
            max_body_bytes: config.listener.max_body_bytes,
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Layers run outside-in: request id, trace span, id propagation, timeout.
    /// An expired inbound deadline answers 504 in the error envelope.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let catch_all = format!("{}/{{*path}}", config.gateway.path_prefix);

        Router::new()
            .route(&catch_all, any(gateway::catch_all))
            .route(
                &config.named_proxy.path,
                get(proxy::named_read)
                    .post(proxy::named_upload)
                    .fallback(proxy::method_not_allowed),
            )
            .route("/healthz", get(healthz))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(HandleErrorLayer::new(handle_middleware_error))
                    .timeout(Duration::from_secs(config.timeouts.request_secs)),
            )
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id(request),
                )
            }))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
    }

    /// The router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            backend = %self.config.backend.base_url,
            named_backend = %self.config.named_base_url(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Local liveness; never touches the backend.
async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
