//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher / role cache
//!     → events.rs (GatewayEvent through an injected EventSink)
//!     → TracingSink: logging (tracing) + metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Core components never log directly; they emit events to a sink
//! - Request ID flows from the inbound request to the backend and back
//! - Metrics are cheap (atomic increments)

pub mod events;
pub mod logging;
pub mod metrics;

pub use events::{EventSink, GatewayEvent, MemorySink, Route, TracingSink};
