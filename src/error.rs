//! Gateway error taxonomy and the uniform JSON error envelope.
//!
//! Backend-reported errors (non-2xx statuses) are not represented here: they
//! are relayed to the caller untouched.

use axum::extract::rejection::QueryRejection;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{BoxError, Json};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ConfigError;
use crate::forward::TransportError;

/// Body of every error the gateway itself produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: String,
}

impl ErrorEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: message.into(),
        }
    }
}

/// Failures detected at the dispatcher boundary.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The backend could not be reached or answered unreadably.
    #[error("upstream request failed: {0}")]
    Transport(#[from] TransportError),

    /// Caller input was missing or malformed; no network call was made.
    #[error("{0}")]
    Validation(String),

    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("method {0} is not forwarded")]
    MethodNotAllowed(Method),

    /// The inbound deadline passed before an answer was ready.
    #[error("request timed out")]
    Timeout,

    #[error("middleware failure: {0}")]
    Internal(String),
}

impl GatewayError {
    pub fn validation(message: impl Into<String>) -> Self {
        GatewayError::Validation(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Transport(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::Transport(_) => StatusCode::BAD_GATEWAY,
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            GatewayError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show the caller. Transport details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            GatewayError::Transport(e) if e.is_timeout() => "Upstream service timed out".to_string(),
            GatewayError::Transport(_) => "Upstream service unavailable".to_string(),
            GatewayError::Timeout => "Upstream service timed out".to_string(),
            GatewayError::Internal(_) => "Internal gateway error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<QueryRejection> for GatewayError {
    fn from(rejection: QueryRejection) -> Self {
        GatewayError::Validation(rejection.body_text())
    }
}

/// Turn a middleware error (the inbound timeout) into the error envelope.
pub async fn handle_middleware_error(error: BoxError) -> GatewayError {
    if error.is::<tower::timeout::error::Elapsed>() {
        GatewayError::Timeout
    } else {
        GatewayError::Internal(error.to_string())
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorEnvelope::new(self.public_message()))).into_response()
    }
}

/// Failures while assembling the server at startup.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forward::TransportErrorKind;

    #[test]
    fn test_transport_detail_not_exposed() {
        let err = GatewayError::from(TransportError::new(
            TransportErrorKind::Connect,
            "tcp connect error: 10.0.3.7:8000 refused",
        ));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert!(!err.public_message().contains("10.0.3.7"));
    }

    #[test]
    fn test_timeout_maps_to_504() {
        let err = GatewayError::from(TransportError::new(TransportErrorKind::Timeout, "deadline"));
        assert_eq!(err.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn test_validation_message_is_shown() {
        let err = GatewayError::validation("endpoint must not be empty");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "endpoint must not be empty");
    }

    #[tokio::test]
    async fn test_elapsed_maps_to_504() {
        let err = handle_middleware_error(Box::new(tower::timeout::error::Elapsed::new())).await;
        assert!(matches!(err, GatewayError::Timeout));
        assert_eq!(err.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(err.public_message(), "Upstream service timed out");

        let err = handle_middleware_error("boom".into()).await;
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.public_message().contains("boom"));
    }

    #[tokio::test]
    async fn test_envelope_shape() {
        let response = GatewayError::MethodNotAllowed(Method::TRACE).into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let envelope: ErrorEnvelope = serde_json::from_slice(&body).unwrap();
        assert_eq!(envelope, ErrorEnvelope::new("method TRACE is not forwarded"));
    }
}
