//! Named-endpoint selection.
//!
//! The backend operation comes from the `endpoint` query parameter. Missing
//! or empty values fall back to a fixed default per direction.

use crate::error::GatewayError;

/// Target of a named read when the caller names none.
pub const DEFAULT_READ_ENDPOINT: &str = "health";
/// Target of a named upload when the caller names none.
pub const DEFAULT_WRITE_ENDPOINT: &str = "generate";

/// A validated backend operation name, e.g. `health` or `documents/upload`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedEndpoint {
    segments: Vec<String>,
}

impl NamedEndpoint {
    /// Resolve the query parameter against `default`.
    pub fn resolve(raw: Option<&str>, default: &str) -> Result<Self, GatewayError> {
        let name = raw.map(str::trim).filter(|s| !s.is_empty()).unwrap_or(default);
        Self::parse(name)
    }

    fn parse(name: &str) -> Result<Self, GatewayError> {
        let trimmed = name.trim_matches('/');
        if trimmed.is_empty() {
            return Err(GatewayError::validation("endpoint must not be empty"));
        }

        let mut segments = Vec::new();
        for segment in trimmed.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." {
                return Err(GatewayError::validation(format!(
                    "endpoint '{name}' contains an invalid path segment"
                )));
            }
            if segment.chars().any(|c| c.is_control() || c.is_whitespace()) {
                return Err(GatewayError::validation(format!(
                    "endpoint '{name}' contains whitespace or control characters"
                )));
            }
            segments.push(segment.to_string());
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn into_segments(self) -> Vec<String> {
        self.segments
    }
}

impl std::fmt::Display for NamedEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let read = NamedEndpoint::resolve(None, DEFAULT_READ_ENDPOINT).unwrap();
        assert_eq!(read.to_string(), "health");

        let write = NamedEndpoint::resolve(Some(""), DEFAULT_WRITE_ENDPOINT).unwrap();
        assert_eq!(write.to_string(), "generate");

        let blank = NamedEndpoint::resolve(Some("   "), DEFAULT_READ_ENDPOINT).unwrap();
        assert_eq!(blank.to_string(), "health");
    }

    #[test]
    fn test_explicit_endpoint() {
        let endpoint = NamedEndpoint::resolve(Some("documents/upload"), DEFAULT_WRITE_ENDPOINT).unwrap();
        assert_eq!(endpoint.segments(), ["documents", "upload"]);

        let slashed = NamedEndpoint::resolve(Some("/status/"), DEFAULT_READ_ENDPOINT).unwrap();
        assert_eq!(slashed.segments(), ["status"]);
    }

    #[test]
    fn test_rejects_traversal_and_garbage() {
        for raw in ["../admin", "a//b", "a/./b", "a b", "tab\there", "/"] {
            let err = NamedEndpoint::resolve(Some(raw), DEFAULT_READ_ENDPOINT).unwrap_err();
            assert!(matches!(err, GatewayError::Validation(_)), "{raw} should be rejected");
        }
    }
}
