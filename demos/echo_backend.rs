//! Stand-in backend for local runs of the gateway.
//!
//! ```text
//! cargo run --example echo_backend          # listens on 127.0.0.1:8000
//! cargo run                                 # gateway on 0.0.0.0:3000
//! curl localhost:3000/api/v1/jobs/42
//! ```

use std::collections::BTreeMap;
use std::net::SocketAddr;

use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let app = Router::new()
        .route("/api/v1/health", get(|| async { Json(json!({"status": "healthy"})) }))
        .route("/api/v1/user/role", get(role))
        .fallback(echo);

    let addr = SocketAddr::from(([127, 0, 0, 1], 8000));
    println!("Echo backend listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Value> {
    let headers: BTreeMap<String, String> = headers
        .iter()
        .map(|(k, v)| (k.to_string(), String::from_utf8_lossy(v.as_bytes()).into_owned()))
        .collect();

    Json(json!({
        "method": method.as_str(),
        "path": uri.path(),
        "query": uri.query(),
        "headers": headers,
        "body": String::from_utf8_lossy(&body),
    }))
}

/// Any bearer token is an admin named after the token.
async fn role(headers: HeaderMap) -> impl IntoResponse {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match token {
        Some(token) if !token.is_empty() => (
            StatusCode::OK,
            Json(json!({
                "user_id": format!("user_{token}"),
                "role": "admin",
                "first_name": null,
                "last_name": null
            })),
        ),
        _ => (StatusCode::UNAUTHORIZED, Json(json!({"detail": "missing bearer token"}))),
    }
}
