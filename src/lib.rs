//! exgen API gateway library.
//!
//! A thin server-side gateway in front of the document-generation backend:
//! a catch-all `/api/v1/*` passthrough, a named-endpoint proxy that injects a
//! trusted credential, and a client-side role cache with in-flight
//! deduplication.

pub mod config;
pub mod error;
pub mod forward;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod role;
pub mod routing;
pub mod security;

pub use config::schema::GatewayConfig;
pub use error::{ErrorEnvelope, GatewayError, ServerError};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use role::RoleCache;
