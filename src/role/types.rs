//! Role payloads and cache records.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
    Owner,
}

/// What the role endpoint returns for the signed-in user.
///
/// Every field is nullable; the all-`None` value means "no role".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserRole {
    pub user_id: Option<String>,
    pub role: Option<Role>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl UserRole {
    /// The "no role" sentinel handed to unauthenticated callers.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn has_role(&self) -> bool {
        self.role.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.role == Some(Role::Admin)
    }

    pub fn is_owner(&self) -> bool {
        self.role == Some(Role::Owner)
    }

    pub fn is_user(&self) -> bool {
        self.role == Some(Role::User)
    }

    /// Admin or owner.
    pub fn has_admin_access(&self) -> bool {
        self.is_admin() || self.is_owner()
    }
}

/// In-memory cache slot.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub payload: UserRole,
    pub fetched_at_ms: u64,
}

impl CacheEntry {
    /// Fresh while `now < fetched_at + ttl`.
    pub fn is_fresh(&self, now_ms: u64, ttl_ms: u64) -> bool {
        now_ms < self.fetched_at_ms.saturating_add(ttl_ms)
    }
}

/// Shape written under the persisted store key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedRole {
    pub data: UserRole,
    /// Epoch milliseconds of the fetch.
    pub timestamp: u64,
}

/// An authenticated caller: the cache key plus the credential used to fetch.
#[derive(Clone)]
pub struct Requester {
    pub subject: String,
    pub token: String,
}

impl Requester {
    pub fn new(subject: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            token: token.into(),
        }
    }
}

impl fmt::Debug for Requester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Requester")
            .field("subject", &self.subject)
            .field("token", &"<redacted>")
            .finish()
    }
}
