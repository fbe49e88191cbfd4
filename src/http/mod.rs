//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request id, trace span, timeout)
//!     → gateway.rs / proxy.rs (extract method, path, query, body)
//!     → routing::Dispatcher (filter headers, forward)
//!     → response.rs (passthrough or envelope)
//!     → Send to client
//! ```

pub mod gateway;
pub mod proxy;
pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use response::ProxyEnvelope;
pub use server::{AppState, HttpServer};
