//! In-process cache store

use super::CacheStore;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

struct Entry {
    value: String,
    expires_at: Instant,
}

/// Entry count at which `set` starts sweeping expired entries
const DEFAULT_SWEEP_THRESHOLD: usize = 1024;

/// Process-wide in-memory store with lazy expiry.
///
/// Reads drop the expired entry they hit. Once the map reaches the sweep
/// threshold, each insert also evicts every expired entry, so keys that are
/// never read again (per-commit statuses, suites) do not pile up.
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
    sweep_threshold: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_sweep_threshold(DEFAULT_SWEEP_THRESHOLD)
    }
}

impl MemoryStore {
    /// Store that sweeps expired entries once it holds `threshold` of them
    pub fn with_sweep_threshold(threshold: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            sweep_threshold: threshold,
        }
    }

    /// Number of entries, including expired ones not yet evicted
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the store holds no entries
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Entry>> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn set(&self, key: &str, value: String, ttl: Duration) {
        let now = Instant::now();
        let mut entries = self.lock();
        if entries.len() >= self.sweep_threshold {
            entries.retain(|_, entry| entry.expires_at > now);
        }
        entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: now + ttl,
            },
        );
    }

    fn remove(&self, key: &str) {
        self.lock().remove(key);
    }
}
