//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable naming the backend base URL.
pub const ENV_BACKEND_URL: &str = "BACKEND_URL";
/// Environment variable overriding the listener bind address.
pub const ENV_BIND_ADDRESS: &str = "GATEWAY_BIND";
/// Environment variable carrying the named-proxy bearer credential.
pub const ENV_PROXY_TOKEN: &str = "GATEWAY_PROXY_TOKEN";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, apply environment
/// overrides, and validate the result.
///
/// Without a file every section takes its default, so a missing backend URL
/// falls back to [`DEFAULT_BACKEND_URL`](crate::config::schema::DEFAULT_BACKEND_URL).
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => GatewayConfig::default(),
    };

    let config = apply_env_overrides(config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment values on top of a loaded configuration.
///
/// Blank values are ignored so an exported-but-empty variable does not wipe
/// a working default.
pub fn apply_env_overrides<F>(mut config: GatewayConfig, lookup: F) -> GatewayConfig
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = get(ENV_BACKEND_URL) {
        config.backend.base_url = url;
    }
    if let Some(addr) = get(ENV_BIND_ADDRESS) {
        config.listener.bind_address = addr;
    }
    if let Some(token) = get(ENV_PROXY_TOKEN) {
        config.named_proxy.bearer_token = token;
    }

    config
}
