//! Time-boxed memoization of GitHub lookups.
//!
//! Entries are namespaced by the requesting user's login, so cached data is
//! never shared across users. The backing store is injected through
//! [`CacheStore`]; [`MemoryStore`] is the in-process implementation.
//!
//! ```text
//! get_or_compute(user, key, ttl, factory)
//!        │
//!        ├─ disabled or ttl < short lifetime ──► factory()
//!        ├─ store hit ─────────────────────────► cached value
//!        └─ miss ─► per-key lock ─► re-check ─► factory() ─► store.set()
//! ```

mod memory;

pub use memory::MemoryStore;

use crate::config::Options;
use crate::error::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

/// Key-value store with per-entry expiry.
///
/// Values are serialized JSON so the trait stays object safe.
pub trait CacheStore: Send + Sync {
    /// Get a live entry
    fn get(&self, key: &str) -> Option<String>;

    /// Insert or replace an entry that expires after `ttl`
    fn set(&self, key: &str, value: String, ttl: Duration);

    /// Drop an entry
    fn remove(&self, key: &str);
}

/// Which of the two conventional lifetimes a lookup uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifetime {
    /// Volatile data (commit status, checks)
    Short,
    /// Near-static data (users, repositories, branch protection)
    Long,
}

/// When to bypass the cache, and how long entries live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Bypass the cache for every lookup
    pub disabled: bool,
    /// Short lifetime; any ttl below this bypasses the cache
    pub short: Duration,
    /// Long lifetime
    pub long: Duration,
}

impl CachePolicy {
    /// Policy derived from options
    pub const fn from_options(options: &Options) -> Self {
        Self {
            disabled: options.disable_caching,
            short: options.short_cache_lifetime(),
            long: options.cache_lifetime(),
        }
    }

    /// Duration for a named lifetime
    pub const fn ttl(&self, lifetime: Lifetime) -> Duration {
        match lifetime {
            Lifetime::Short => self.short,
            Lifetime::Long => self.long,
        }
    }

    /// Whether a lookup with this ttl must go straight to the factory
    pub fn bypasses(&self, ttl: Duration) -> bool {
        self.disabled || ttl.is_zero() || ttl < self.short
    }
}

/// Shared cache handle; cheap to clone.
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn CacheStore>,
    policy: CachePolicy,
    in_flight: Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>,
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache").field("policy", &self.policy).finish()
    }
}

impl Cache {
    /// Create a cache over the given store
    pub fn new(store: Arc<dyn CacheStore>, policy: CachePolicy) -> Self {
        Self {
            store,
            policy,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// In-memory cache configured from options
    pub fn in_memory(options: &Options) -> Self {
        Self::new(
            Arc::new(MemoryStore::default()),
            CachePolicy::from_options(options),
        )
    }

    /// The active policy
    pub const fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    /// Return the cached value for `(user, key)` or compute and store it.
    ///
    /// Concurrent calls for the same key wait for the first computation
    /// instead of repeating it. Errors are never cached.
    pub async fn get_or_compute<T, F, Fut>(
        &self,
        user: &str,
        key: &str,
        ttl: Duration,
        factory: F,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if self.policy.bypasses(ttl) {
            return factory().await;
        }

        let full_key = format!("{user}:{key}");
        if let Some(value) = self.lookup(&full_key) {
            debug!(key = %full_key, "cache hit");
            return Ok(value);
        }

        let key_lock = self.key_lock(&full_key);
        let _guard = key_lock.lock().await;
        let _release = InFlightRelease {
            cache: self,
            key: &full_key,
        };

        // Another caller may have filled the entry while we waited
        if let Some(value) = self.lookup(&full_key) {
            debug!(key = %full_key, "cache hit after wait");
            return Ok(value);
        }

        debug!(key = %full_key, "cache miss");
        let result = factory().await;
        if let Ok(ref value) = result {
            match serde_json::to_string(value) {
                Ok(json) => self.store.set(&full_key, json, ttl),
                Err(e) => debug!(key = %full_key, error = %e, "failed to serialize cache entry"),
            }
        }
        result
    }

    /// Drop a cached entry for a user
    pub fn invalidate(&self, user: &str, key: &str) {
        self.store.remove(&format!("{user}:{key}"));
    }

    fn lookup<T: DeserializeOwned>(&self, full_key: &str) -> Option<T> {
        let json = self.store.get(full_key)?;
        match serde_json::from_str(&json) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(key = %full_key, error = %e, "discarding unreadable cache entry");
                self.store.remove(full_key);
                None
            }
        }
    }

    fn key_lock(&self, full_key: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Arc::clone(in_flight.entry(full_key.to_string()).or_default())
    }

    fn release_key_lock(&self, full_key: &str) {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        in_flight.remove(full_key);
    }
}

/// Removes the in-flight entry for a key when the computing caller finishes
/// or is dropped mid-computation.
struct InFlightRelease<'a> {
    cache: &'a Cache,
    key: &'a str,
}

impl Drop for InFlightRelease<'_> {
    fn drop(&mut self) {
        self.cache.release_key_lock(self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn policy() -> CachePolicy {
        CachePolicy {
            disabled: false,
            short: Duration::from_secs(30),
            long: Duration::from_secs(3600),
        }
    }

    fn cache(policy: CachePolicy) -> Cache {
        Cache::new(Arc::new(MemoryStore::default()), policy)
    }

    #[tokio::test]
    async fn test_second_lookup_is_served_from_cache() {
        let cache = cache(policy());
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let value: u32 = cache
                .get_or_compute("octocat", "answer", Duration::from_secs(60), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(42)
                })
                .await
                .unwrap();
            assert_eq!(value, 42);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_entries_are_namespaced_by_user() {
        let cache = cache(policy());

        let a: String = cache
            .get_or_compute("alice", "me", Duration::from_secs(60), || async {
                Ok("alice".to_string())
            })
            .await
            .unwrap();
        let b: String = cache
            .get_or_compute("bob", "me", Duration::from_secs(60), || async {
                Ok("bob".to_string())
            })
            .await
            .unwrap();

        assert_eq!(a, "alice");
        assert_eq!(b, "bob");
    }

    #[tokio::test]
    async fn test_ttl_below_floor_bypasses_cache() {
        let cache = cache(policy());
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let _: u32 = cache
                .get_or_compute("octocat", "k", Duration::from_secs(5), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(1)
                })
                .await
                .unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_disabled_cache_always_computes() {
        let cache = cache(CachePolicy {
            disabled: true,
            ..policy()
        });
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let _: u32 = cache
                .get_or_compute("octocat", "k", Duration::from_secs(3600), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(1)
                })
                .await
                .unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache = cache(policy());

        let first: Result<u32> = cache
            .get_or_compute("octocat", "k", Duration::from_secs(60), || async {
                Err(Error::GitHubApi("boom".to_string()))
            })
            .await;
        assert!(first.is_err());

        let second: u32 = cache
            .get_or_compute("octocat", "k", Duration::from_secs(60), || async { Ok(7) })
            .await
            .unwrap();
        assert_eq!(second, 7);
    }

    #[tokio::test]
    async fn test_concurrent_lookups_coalesce() {
        let cache = cache(policy());
        let calls = Arc::new(AtomicUsize::new(0));

        let lookup = |cache: Cache, calls: Arc<AtomicUsize>| async move {
            cache
                .get_or_compute::<u32, _, _>("octocat", "slow", Duration::from_secs(60), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    Ok(9)
                })
                .await
        };

        let (a, b) = tokio::join!(
            lookup(cache.clone(), Arc::clone(&calls)),
            lookup(cache.clone(), Arc::clone(&calls))
        );

        assert_eq!(a.unwrap(), 9);
        assert_eq!(b.unwrap(), 9);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_lookup_releases_key_lock() {
        let cache = cache(policy());

        let slow = cache.get_or_compute::<u32, _, _>(
            "octocat",
            "slow",
            Duration::from_secs(60),
            || async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(1)
            },
        );
        let timed_out = tokio::time::timeout(Duration::from_secs(1), slow).await;
        assert!(timed_out.is_err());
        assert!(cache.in_flight.lock().unwrap().is_empty());

        let value: u32 = cache
            .get_or_compute("octocat", "slow", Duration::from_secs(60), || async { Ok(2) })
            .await
            .unwrap();
        assert_eq!(value, 2);
        assert!(cache.in_flight.lock().unwrap().is_empty());
    }
}
