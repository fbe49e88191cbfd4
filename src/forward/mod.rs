//! Request forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! ForwardRequest (method, base, segments, query, filtered headers, body)
//!     → types.rs (compose backend URL)
//!     → forwarder.rs (one outbound call, body buffered both ways)
//!     → ForwardResult (status, headers, body) | TransportError
//! ```
//!
//! # Design Decisions
//! - Bodies are buffered, not streamed; payloads are small API bodies and forms
//! - No retries here; callers decide
//! - The outbound call runs on its own task, so dropping the inbound
//!   connection does not cancel it

pub mod error;
pub mod forwarder;
pub mod types;

pub use error::{TransportError, TransportErrorKind};
pub use forwarder::Forwarder;
pub use types::{ForwardMethod, ForwardRequest, ForwardResult};
