//! Transport-level failures of an outbound call.

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

/// What went wrong on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// DNS resolution or TCP/TLS connect failed.
    Connect,
    /// The backend did not answer in time.
    Timeout,
    /// The response could not be read or was malformed.
    Body,
    /// The target URL could not be built.
    InvalidTarget,
    /// The outbound task ended without producing a result.
    Aborted,
    /// Any other client-side failure.
    Request,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransportErrorKind::Connect => "connect",
            TransportErrorKind::Timeout => "timeout",
            TransportErrorKind::Body => "body",
            TransportErrorKind::InvalidTarget => "invalid_target",
            TransportErrorKind::Aborted => "aborted",
            TransportErrorKind::Request => "request",
        };
        f.write_str(name)
    }
}

/// The backend could not be reached or its answer could not be read.
#[derive(Debug, Error)]
#[error("{kind} error: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
    #[source]
    pub cause: Option<Box<dyn StdError + Send + Sync>>,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            cause: None,
        }
    }

    pub fn with_cause(mut self, cause: impl StdError + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == TransportErrorKind::Timeout
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        let kind = if e.is_timeout() {
            TransportErrorKind::Timeout
        } else if e.is_connect() {
            TransportErrorKind::Connect
        } else if e.is_body() || e.is_decode() {
            TransportErrorKind::Body
        } else if e.is_builder() {
            TransportErrorKind::InvalidTarget
        } else {
            TransportErrorKind::Request
        };
        TransportError::new(kind, e.to_string()).with_cause(e)
    }
}

impl From<url::ParseError> for TransportError {
    fn from(e: url::ParseError) -> Self {
        TransportError::new(TransportErrorKind::InvalidTarget, e.to_string()).with_cause(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_source() {
        let err = TransportError::from(url::ParseError::EmptyHost);
        assert_eq!(err.kind, TransportErrorKind::InvalidTarget);
        assert!(err.to_string().starts_with("invalid_target error:"));
        assert!(err.source().is_some());
        assert!(!err.is_timeout());
    }
}
