//! Named-endpoint proxy handlers.
//!
//! Both answer with the `{status, data, headers}` envelope; the backend's
//! own status travels inside it.

use axum::body::Body;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, Method};
use axum::response::Response;
use serde::Deserialize;

use crate::error::GatewayError;
use crate::http::request::read_body;
use crate::http::response;
use crate::http::server::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct EndpointQuery {
    pub endpoint: Option<String>,
}

pub async fn named_read(
    State(state): State<AppState>,
    query: Result<Query<EndpointQuery>, QueryRejection>,
) -> Result<Response, GatewayError> {
    let Query(query) = query?;
    let result = state.dispatcher.named_read(query.endpoint.as_deref()).await?;
    Ok(response::envelope(result))
}

pub async fn named_upload(
    State(state): State<AppState>,
    query: Result<Query<EndpointQuery>, QueryRejection>,
    headers: HeaderMap,
    body: Body,
) -> Result<Response, GatewayError> {
    let Query(query) = query?;
    let body = read_body(body, state.max_body_bytes).await?;
    let result = state
        .dispatcher
        .named_upload(query.endpoint.as_deref(), &headers, body)
        .await?;
    Ok(response::envelope(result))
}

/// Any other method on the named proxy path.
pub async fn method_not_allowed(method: Method) -> GatewayError {
    GatewayError::MethodNotAllowed(method)
}
