//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Catch-all:   method + path after prefix + query
//!     → dispatcher.rs (segments, passthrough header policy)
//! Named:       ?endpoint=<name>
//!     → endpoint.rs (validate, default health / generate)
//!     → dispatcher.rs (trusted header policy)
//!
//! Both → Forwarder → ForwardResult | GatewayError
//! ```
//!
//! # Design Decisions
//! - Stateless: each call is one request/response transaction
//! - Input is validated before any network call is made
//! - Transport failures are reported to the event sink, never echoed to the caller

pub mod dispatcher;
pub mod endpoint;

pub use dispatcher::Dispatcher;
pub use endpoint::{NamedEndpoint, DEFAULT_READ_ENDPOINT, DEFAULT_WRITE_ENDPOINT};
