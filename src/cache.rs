//! Per-document snapshot cache.
//!
//! Every upstream document kind (scoreboard, status, round, team directory,
//! tick pointer) gets its own [`CacheSlot`] with its own clock.  A slot keeps
//! the last successfully fetched value together with the time it was fetched
//! and hands it out again until the TTL has elapsed.
//!
//! A refresh replaces the value wholesale.  A failed refresh leaves the old
//! entry in place but still surfaces the error to the caller, so stale data
//! is never served; the next read simply tries again.
//!
//! The slot lock is held across the refresh, so callers racing on an expired
//! entry wait for the in-flight fetch and then see it as a hit.

use chrono::{DateTime, Duration, Utc};
use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::Result;

/// How long any fetched document is reused before hitting upstream again.
pub const DOCUMENT_TTL_SECS: i64 = 10;

/// Source of "now" for freshness decisions.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A cached document and the moment it was fetched.
#[derive(Debug)]
pub struct CacheEntry<T> {
    pub value: Arc<T>,
    pub fetched_at: DateTime<Utc>,
}

impl<T> Clone for CacheEntry<T> {
    fn clone(&self) -> Self {
        CacheEntry {
            value: Arc::clone(&self.value),
            fetched_at: self.fetched_at,
        }
    }
}

impl<T> CacheEntry<T> {
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.fetched_at + ttl > now
    }
}

/// Single cache slot, optionally keyed (e.g. a round document keyed by tick).
///
/// A cached entry stored under a different key than the one requested is
/// treated as a miss.
pub struct CacheSlot<T, K = ()> {
    name: &'static str,
    ttl: Duration,
    inner: Mutex<Option<(K, CacheEntry<T>)>>,
}

impl<T, K> CacheSlot<T, K>
where
    K: PartialEq + Debug,
{
    pub fn new(name: &'static str) -> Self {
        Self::with_ttl(name, Duration::seconds(DOCUMENT_TTL_SECS))
    }

    pub fn with_ttl(name: &'static str, ttl: Duration) -> Self {
        CacheSlot {
            name,
            ttl,
            inner: Mutex::new(None),
        }
    }

    /// Return the cached entry for `key` if it is still fresh at `now`,
    /// otherwise run `refresh` and store its result.
    pub async fn get_or_refresh<F, Fut>(
        &self,
        now: DateTime<Utc>,
        key: K,
        refresh: F,
    ) -> Result<CacheEntry<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut slot = self.inner.lock().await;

        if let Some((cached_key, entry)) = slot.as_ref() {
            if *cached_key == key && entry.is_fresh(now, self.ttl) {
                debug!(
                    "Using cached {} for {:?} (fetched at {})",
                    self.name, key, entry.fetched_at
                );
                return Ok(entry.clone());
            }
        }

        let value = refresh().await?;
        let entry = CacheEntry {
            value: Arc::new(value),
            fetched_at: now,
        };
        *slot = Some((key, entry.clone()));
        Ok(entry)
    }

    /// The last stored entry, regardless of freshness.
    #[cfg(test)]
    pub async fn peek(&self) -> Option<CacheEntry<T>> {
        self.inner.lock().await.as_ref().map(|(_, e)| e.clone())
    }
}
