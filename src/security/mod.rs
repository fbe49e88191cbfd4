//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request headers:
//!     → headers.rs (strip host and hop-by-hop, apply credential policy)
//!     → forwarded to the backend
//!
//! Backend response headers:
//!     → headers.rs (strip hop-by-hop)
//!     → relayed to the client
//! ```

pub mod headers;

pub use headers::{strip_hop_by_hop, HeaderPolicy};
