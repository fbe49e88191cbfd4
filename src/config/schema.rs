//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Backend used when neither the config file nor the environment names one.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Backend service the gateway forwards to.
    pub backend: BackendConfig,

    /// Catch-all passthrough routes.
    pub gateway: CatchAllConfig,

    /// Named-endpoint proxy routes.
    pub named_proxy: NamedProxyConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,

    /// Largest inbound body the gateway buffers before forwarding.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            max_body_bytes: 10 * 1024 * 1024, // 10MB, form uploads included
        }
    }
}

/// Backend service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the backend API (scheme, host, optional port).
    pub base_url: String,

    /// Version prefix placed between the base URL and the forwarded path.
    pub api_prefix: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_string(),
            api_prefix: "/api/v1".to_string(),
        }
    }
}

/// Catch-all proxy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CatchAllConfig {
    /// Inbound path prefix; everything after it is the backend path.
    pub path_prefix: String,
}

impl Default for CatchAllConfig {
    fn default() -> Self {
        Self {
            path_prefix: "/api/v1".to_string(),
        }
    }
}

/// Named-endpoint proxy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NamedProxyConfig {
    /// Inbound path serving both the read and the upload handler.
    pub path: String,

    /// Backend base URL for named calls. Falls back to `backend.base_url`.
    pub base_url: Option<String>,

    /// Credential presented to the backend instead of the caller's.
    pub bearer_token: String,
}

impl Default for NamedProxyConfig {
    fn default() -> Self {
        Self {
            path: "/api/proxy".to_string(),
            base_url: None,
            // WARNING: This is a placeholder! Change this in production.
            bearer_token: "CHANGE_ME_IN_PRODUCTION".to_string(),
        }
    }
}

impl GatewayConfig {
    /// Backend base URL used by the named-endpoint proxy.
    pub fn named_base_url(&self) -> &str {
        self.named_proxy
            .base_url
            .as_deref()
            .unwrap_or(&self.backend.base_url)
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Inbound request timeout (whole request/response) in seconds.
    pub request_secs: u64,

    /// Outbound timeout for backend calls. Unset means the client default.
    pub upstream_secs: Option<u64>,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 120,
            upstream_secs: None,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error), used when RUST_LOG is unset.
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
