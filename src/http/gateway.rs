//! Catch-all gateway handler.

use axum::extract::{Request, State};
use axum::response::Response;

use crate::error::GatewayError;
use crate::forward::ForwardMethod;
use crate::http::request::read_body;
use crate::http::response;
use crate::http::server::AppState;

/// Forward `{prefix}/{*path}` to the backend and relay its answer verbatim.
///
/// The remainder is taken from the raw URI so an escaped `/` stays inside
/// its segment.
pub async fn catch_all(State(state): State<AppState>, request: Request) -> Result<Response, GatewayError> {
    let method = ForwardMethod::try_from(request.method()).map_err(GatewayError::MethodNotAllowed)?;
    let (parts, body) = request.into_parts();

    let raw = parts.uri.path();
    let path = raw.strip_prefix(&*state.path_prefix).unwrap_or(raw);

    let body = if method.carries_body() {
        Some(read_body(body, state.max_body_bytes).await?)
    } else {
        None
    };

    tracing::debug!(method = %parts.method, path = %path, "Forwarding catch-all request");

    let result = state
        .dispatcher
        .catch_all(method, path, parts.uri.query(), &parts.headers, body)
        .await?;

    Ok(response::passthrough(result))
}
