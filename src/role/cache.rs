//! Role cache with in-flight request deduplication.
//!
//! # Lookup
//! ```text
//! get_role(None)        → "no role", immediately
//! get_role(Some(r))     → fresh entry?      → payload
//!                       → fetch in flight?  → join it
//!                       → otherwise         → start, register, await
//! ```
//!
//! The freshness check and the in-flight registration happen under one
//! lock, so concurrent callers for the same key share exactly one fetch.
//! Fetches run on their own task: a caller that gives up does not cancel
//! the fetch for the others. Failures are handed to every waiter and never
//! cached.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use futures_util::future::{BoxFuture, Shared};
use futures_util::FutureExt;

use crate::observability::{EventSink, GatewayEvent, TracingSink};
use crate::role::clock::{Clock, SystemClock};
use crate::role::fetcher::RoleFetcher;
use crate::role::store::RoleStore;
use crate::role::types::{CacheEntry, PersistedRole, Requester, UserRole};
use crate::role::{RoleError, StoreError, ROLE_CACHE_KEY, ROLE_CACHE_TTL_MS};

type SharedFetch = Shared<BoxFuture<'static, Result<UserRole, RoleError>>>;

/// Fetch durations kept for the moving average.
const RECENT_FETCHES: usize = 10;

/// Snapshot of cache effectiveness counters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoleStats {
    /// Network fetches started.
    pub api_calls: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    /// Lookups that joined a fetch already in flight.
    pub duplicate_requests: u64,
    /// Mean of the last ten fetch durations, in milliseconds.
    pub average_response_ms: f64,
    /// `hits / (hits + misses)`, 0 when nothing was looked up yet.
    pub hit_rate: f64,
}

#[derive(Default)]
struct Counters {
    api_calls: u64,
    cache_hits: u64,
    cache_misses: u64,
    duplicate_requests: u64,
    recent_ms: VecDeque<u64>,
}

struct InFlight {
    id: u64,
    fetch: SharedFetch,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<String, CacheEntry>,
    in_flight: HashMap<String, InFlight>,
    counters: Counters,
}

struct CacheState {
    inner: Mutex<Inner>,
    next_id: AtomicU64,
    fetcher: Arc<dyn RoleFetcher>,
    store: Arc<dyn RoleStore>,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn EventSink>,
    ttl_ms: u64,
}

/// Process-wide role cache. Clones share state.
#[derive(Clone)]
pub struct RoleCache {
    shared: Arc<CacheState>,
}

impl RoleCache {
    /// System clock, tracing sink, five minute TTL.
    pub fn new(fetcher: Arc<dyn RoleFetcher>, store: Arc<dyn RoleStore>) -> Self {
        Self::with_parts(
            fetcher,
            store,
            Arc::new(SystemClock),
            Arc::new(TracingSink),
            ROLE_CACHE_TTL_MS,
        )
    }

    pub fn with_parts(
        fetcher: Arc<dyn RoleFetcher>,
        store: Arc<dyn RoleStore>,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn EventSink>,
        ttl_ms: u64,
    ) -> Self {
        Self {
            shared: Arc::new(CacheState {
                inner: Mutex::new(Inner::default()),
                next_id: AtomicU64::new(0),
                fetcher,
                store,
                clock,
                sink,
                ttl_ms,
            }),
        }
    }

    /// Restore the persisted entry, if it is readable and still fresh.
    ///
    /// The entry is keyed by the `user_id` it carries. Anything unreadable,
    /// stale or anonymous is removed from the store. Returns the restored
    /// subject.
    pub fn load(&self) -> Option<String> {
        let shared = &self.shared;
        let raw = match shared.store.get(ROLE_CACHE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(error) => {
                shared.report_store_failure("get", &error);
                return None;
            }
        };

        let now = shared.clock.now_millis();
        let restored = serde_json::from_str::<PersistedRole>(&raw).ok().and_then(|p| {
            let subject = p.data.user_id.clone()?;
            let entry = CacheEntry {
                payload: p.data,
                fetched_at_ms: p.timestamp,
            };
            entry.is_fresh(now, shared.ttl_ms).then_some((subject, entry))
        });

        let Some((subject, entry)) = restored else {
            shared.remove_persisted();
            return None;
        };

        shared.lock().entries.insert(subject.clone(), entry);
        tracing::debug!(subject = %subject, "Restored persisted role");
        Some(subject)
    }

    /// Resolve the role for `requester`.
    ///
    /// Unauthenticated callers and fresh hits complete without suspending.
    pub async fn get_role(&self, requester: Option<&Requester>) -> Result<UserRole, RoleError> {
        let Some(requester) = requester else {
            return Ok(UserRole::none());
        };
        let key = requester.subject.as_str();
        let shared = &self.shared;

        let fetch = {
            let mut inner = shared.lock();
            let now = shared.clock.now_millis();

            if let Some(entry) = inner.entries.get(key).filter(|e| e.is_fresh(now, shared.ttl_ms)) {
                let payload = entry.payload.clone();
                inner.counters.cache_hits += 1;
                shared.sink.emit(&GatewayEvent::RoleCacheHit { key });
                return Ok(payload);
            }

            inner.counters.cache_misses += 1;
            shared.sink.emit(&GatewayEvent::RoleCacheMiss { key });

            if let Some(in_flight) = inner.in_flight.get(key) {
                let fetch = in_flight.fetch.clone();
                inner.counters.duplicate_requests += 1;
                shared.sink.emit(&GatewayEvent::RoleFetchJoined { key });
                fetch
            } else {
                let id = shared.next_id.fetch_add(1, Ordering::Relaxed);
                let fetch = self.start_fetch(requester, id);
                inner.counters.api_calls += 1;
                inner.in_flight.insert(
                    key.to_string(),
                    InFlight {
                        id,
                        fetch: fetch.clone(),
                    },
                );
                shared.sink.emit(&GatewayEvent::RoleFetchStarted { key });
                fetch
            }
        };

        fetch.await
    }

    fn start_fetch(&self, requester: &Requester, id: u64) -> SharedFetch {
        let request = self.shared.fetcher.fetch(requester);
        let shared = self.shared.clone();
        let key = requester.subject.clone();

        let task = tokio::spawn(async move {
            let start = Instant::now();
            let result = request.await;
            shared.complete(&key, id, &result, start.elapsed());
            result
        });

        async move { task.await.unwrap_or(Err(RoleError::Aborted)) }
            .boxed()
            .shared()
    }

    /// Drop everything known about `key`: entry, pending fetch and the
    /// persisted record. A pending fetch still resolves for its waiters but
    /// its result is not stored.
    pub fn forget_role(&self, key: &str) {
        let shared = &self.shared;
        {
            let mut inner = shared.lock();
            inner.entries.remove(key);
            inner.in_flight.remove(key);
            shared.remove_persisted();
        }
        shared.sink.emit(&GatewayEvent::RoleInvalidated { key });
    }

    /// Forget every key (logout).
    pub fn clear(&self) {
        let shared = &self.shared;
        let mut inner = shared.lock();
        inner.entries.clear();
        inner.in_flight.clear();
        shared.remove_persisted();
    }

    pub fn stats(&self) -> RoleStats {
        let inner = self.shared.lock();
        let c = &inner.counters;

        let average_response_ms = if c.recent_ms.is_empty() {
            0.0
        } else {
            c.recent_ms.iter().sum::<u64>() as f64 / c.recent_ms.len() as f64
        };
        let lookups = c.cache_hits + c.cache_misses;
        let hit_rate = if lookups == 0 {
            0.0
        } else {
            c.cache_hits as f64 / lookups as f64
        };

        RoleStats {
            api_calls: c.api_calls,
            cache_hits: c.cache_hits,
            cache_misses: c.cache_misses,
            duplicate_requests: c.duplicate_requests,
            average_response_ms,
            hit_rate,
        }
    }
}

impl CacheState {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs on the fetch task once the endpoint answered.
    fn complete(&self, key: &str, id: u64, result: &Result<UserRole, RoleError>, elapsed: Duration) {
        let mut inner = self.lock();

        let registered = inner.in_flight.get(key).is_some_and(|f| f.id == id);
        if registered {
            inner.in_flight.remove(key);
        }

        inner.counters.recent_ms.push_back(elapsed.as_millis() as u64);
        if inner.counters.recent_ms.len() > RECENT_FETCHES {
            inner.counters.recent_ms.pop_front();
        }

        match result {
            Ok(payload) => {
                self.sink.emit(&GatewayEvent::RoleFetchSucceeded { key, elapsed });
                if !registered {
                    tracing::debug!(key, "Discarding role fetched for a forgotten key");
                    return;
                }

                let fetched_at_ms = self.clock.now_millis();
                inner.entries.insert(
                    key.to_string(),
                    CacheEntry {
                        payload: payload.clone(),
                        fetched_at_ms,
                    },
                );
                self.persist(payload, fetched_at_ms);
            }
            Err(error) => {
                self.sink.emit(&GatewayEvent::RoleFetchFailed { key, error });
            }
        }
    }

    fn persist(&self, payload: &UserRole, timestamp: u64) {
        let record = PersistedRole {
            data: payload.clone(),
            timestamp,
        };
        let outcome = serde_json::to_string(&record)
            .map_err(StoreError::from)
            .and_then(|raw| self.store.set(ROLE_CACHE_KEY, &raw));
        if let Err(error) = outcome {
            self.report_store_failure("set", &error);
        }
    }

    fn remove_persisted(&self) {
        if let Err(error) = self.store.remove(ROLE_CACHE_KEY) {
            self.report_store_failure("remove", &error);
        }
    }

    fn report_store_failure(&self, operation: &'static str, error: &StoreError) {
        self.sink.emit(&GatewayEvent::RoleStoreFailed { operation, error });
    }
}
