//! Configuration validation.
//!
//! Semantic checks only; serde handles syntax. Returns every problem found,
//! not just the first.

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a configuration, collecting all errors.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }
    if config.listener.max_body_bytes == 0 {
        errors.push(ValidationError::new("listener.max_body_bytes", "must be greater than 0"));
    }

    check_base_url("backend.base_url", &config.backend.base_url, &mut errors);
    if let Some(url) = &config.named_proxy.base_url {
        check_base_url("named_proxy.base_url", url, &mut errors);
    }

    check_path("backend.api_prefix", &config.backend.api_prefix, true, &mut errors);
    check_path("gateway.path_prefix", &config.gateway.path_prefix, false, &mut errors);
    check_path("named_proxy.path", &config.named_proxy.path, false, &mut errors);

    if config.named_proxy.bearer_token.trim().is_empty() {
        errors.push(ValidationError::new("named_proxy.bearer_token", "must not be empty"));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }
    if config.timeouts.upstream_secs == Some(0) {
        errors.push(ValidationError::new(
            "timeouts.upstream_secs",
            "must be greater than 0 when set",
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!(
                "'{}' is not a socket address",
                config.observability.metrics_address
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_base_url(field: &'static str, raw: &str, errors: &mut Vec<ValidationError>) {
    match Url::parse(raw) {
        Ok(url) => {
            if !matches!(url.scheme(), "http" | "https") {
                errors.push(ValidationError::new(
                    field,
                    format!("unsupported scheme '{}'", url.scheme()),
                ));
            } else if url.cannot_be_a_base() || url.host_str().is_none() {
                errors.push(ValidationError::new(field, "must include a host"));
            } else if url.query().is_some() || url.fragment().is_some() {
                errors.push(ValidationError::new(field, "must not carry a query or fragment"));
            }
        }
        Err(e) => errors.push(ValidationError::new(field, format!("invalid URL: {e}"))),
    }
}

/// Paths must be absolute. Route paths must also name at least one segment
/// and carry no trailing slash, since handlers are mounted below them.
fn check_path(field: &'static str, path: &str, allow_root: bool, errors: &mut Vec<ValidationError>) {
    if !path.starts_with('/') {
        errors.push(ValidationError::new(field, "must start with '/'"));
        return;
    }
    if !allow_root && (path == "/" || path.ends_with('/')) {
        errors.push(ValidationError::new(field, "must not end with '/'"));
    }
    if path.contains(['{', '}', '*', '?', '#']) {
        errors.push(ValidationError::new(field, "contains reserved characters"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = GatewayConfig::default();
        config.backend.base_url = "ftp://files.example".into();
        config.gateway.path_prefix = "api".into();
        config.named_proxy.bearer_token = "  ".into();
        config.timeouts.upstream_secs = Some(0);

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "backend.base_url",
                "gateway.path_prefix",
                "named_proxy.bearer_token",
                "timeouts.upstream_secs",
            ]
        );
    }

    #[test]
    fn test_rejects_unparseable_base_url() {
        let mut config = GatewayConfig::default();
        config.named_proxy.base_url = Some("not a url".into());
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "named_proxy.base_url");
    }

    #[test]
    fn test_trailing_slash_on_base_is_fine() {
        let mut config = GatewayConfig::default();
        config.backend.base_url = "http://backend:8000/".into();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_route_paths_need_a_segment() {
        let mut config = GatewayConfig::default();
        config.named_proxy.path = "/".into();
        config.gateway.path_prefix = "/api/v1/".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
