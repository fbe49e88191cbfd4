//! Structured events emitted by the gateway core.
//!
//! Components take an `Arc<dyn EventSink>` instead of logging directly, so a
//! deployment picks the sink and tests can inspect what happened.

use std::sync::Mutex;
use std::time::Duration;

use crate::forward::TransportError;
use crate::observability::metrics;
use crate::role::{RoleError, StoreError};

/// Which gateway entry point handled a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    CatchAll,
    NamedRead,
    NamedUpload,
}

impl Route {
    pub fn as_str(self) -> &'static str {
        match self {
            Route::CatchAll => "catch_all",
            Route::NamedRead => "named_read",
            Route::NamedUpload => "named_upload",
        }
    }
}

#[derive(Debug)]
pub enum GatewayEvent<'a> {
    /// The backend answered (any status).
    Forwarded {
        route: Route,
        method: &'a str,
        status: u16,
        elapsed: Duration,
    },
    /// The backend could not be reached or read.
    UpstreamFailed {
        route: Route,
        method: &'a str,
        target: &'a str,
        error: &'a TransportError,
    },
    RoleCacheHit { key: &'a str },
    RoleCacheMiss { key: &'a str },
    RoleFetchStarted { key: &'a str },
    /// A caller attached to a fetch already in flight.
    RoleFetchJoined { key: &'a str },
    RoleFetchSucceeded { key: &'a str, elapsed: Duration },
    RoleFetchFailed { key: &'a str, error: &'a RoleError },
    RoleInvalidated { key: &'a str },
    RoleStoreFailed { operation: &'static str, error: &'a StoreError },
}

impl GatewayEvent<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            GatewayEvent::Forwarded { .. } => "forwarded",
            GatewayEvent::UpstreamFailed { .. } => "upstream_failed",
            GatewayEvent::RoleCacheHit { .. } => "role_cache_hit",
            GatewayEvent::RoleCacheMiss { .. } => "role_cache_miss",
            GatewayEvent::RoleFetchStarted { .. } => "role_fetch_started",
            GatewayEvent::RoleFetchJoined { .. } => "role_fetch_joined",
            GatewayEvent::RoleFetchSucceeded { .. } => "role_fetch_succeeded",
            GatewayEvent::RoleFetchFailed { .. } => "role_fetch_failed",
            GatewayEvent::RoleInvalidated { .. } => "role_invalidated",
            GatewayEvent::RoleStoreFailed { .. } => "role_store_failed",
        }
    }
}

/// Receives gateway events.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &GatewayEvent<'_>);
}

/// Default sink: `tracing` events plus Prometheus metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &GatewayEvent<'_>) {
        match event {
            GatewayEvent::Forwarded {
                route,
                method,
                status,
                elapsed,
            } => {
                tracing::debug!(route = route.as_str(), method, status, ?elapsed, "Backend responded");
                metrics::record_request(route.as_str(), method, *status, *elapsed);
            }
            GatewayEvent::UpstreamFailed {
                route,
                method,
                target,
                error,
            } => {
                tracing::error!(
                    route = route.as_str(),
                    method,
                    target,
                    kind = %error.kind,
                    error = %error,
                    "Upstream error"
                );
                metrics::record_upstream_failure(route.as_str(), &error.kind.to_string());
            }
            GatewayEvent::RoleCacheHit { key } => {
                tracing::trace!(key, "Role served from cache");
                metrics::record_role_event("role_cache_hits_total");
            }
            GatewayEvent::RoleCacheMiss { key } => {
                tracing::trace!(key, "Role cache miss");
                metrics::record_role_event("role_cache_misses_total");
            }
            GatewayEvent::RoleFetchStarted { key } => {
                tracing::debug!(key, "Fetching role");
                metrics::record_role_event("role_fetches_total");
            }
            GatewayEvent::RoleFetchJoined { key } => {
                tracing::debug!(key, "Joined in-flight role fetch");
                metrics::record_role_event("role_fetch_joined_total");
            }
            GatewayEvent::RoleFetchSucceeded { key, elapsed } => {
                tracing::debug!(key, ?elapsed, "Role fetched");
                metrics::record_role_fetch_duration(*elapsed);
            }
            GatewayEvent::RoleFetchFailed { key, error } => {
                tracing::warn!(key, error = %error, "Role fetch failed");
                metrics::record_role_event("role_fetch_failures_total");
            }
            GatewayEvent::RoleInvalidated { key } => {
                tracing::info!(key, "Role cache entry invalidated");
            }
            GatewayEvent::RoleStoreFailed { operation, error } => {
                tracing::warn!(operation, error = %error, "Role store operation failed");
            }
        }
    }
}

/// Sink that only remembers event names, in order.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<&'static str>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn count(&self, name: &str) -> usize {
        self.names().iter().filter(|n| **n == name).count()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: &GatewayEvent<'_>) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.name());
        }
    }
}
