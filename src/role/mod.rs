//! Client-side role lookup with caching and deduplication.
//!
//! # Data Flow
//! ```text
//! caller → cache.rs (fresh entry / in-flight join / new fetch)
//!            → fetcher.rs (GET /api/v1/user/role through the gateway)
//!            → store.rs (persist {data, timestamp})
//! ```

pub mod cache;
pub mod clock;
pub mod error;
pub mod fetcher;
pub mod store;
pub mod types;

/// Store key of the persisted role record.
pub const ROLE_CACHE_KEY: &str = "exgen_user_role_cache";

/// Five minutes.
pub const ROLE_CACHE_TTL_MS: u64 = 300_000;

pub use cache::{RoleCache, RoleStats};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{RoleError, StoreError};
pub use fetcher::{HttpRoleFetcher, RoleFetcher};
pub use store::{FileStore, MemoryStore, RoleStore};
pub use types::{CacheEntry, PersistedRole, Requester, Role, UserRole};
