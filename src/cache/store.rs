// In-process response cache.
// TTL-keyed entries with bounded capacity and oldest-inserted-first eviction.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use linked_hash_map::LinkedHashMap;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

use crate::config::CacheConfig;

/// Default TTL for cached reads: 5 minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Default capacity.
pub const DEFAULT_MAX_SIZE: usize = 200;

/// Longest TTL an entry can carry; longer TTLs are clamped to it.
pub const MAX_TTL: Duration = Duration::from_secs(10 * 365 * 24 * 60 * 60);

/// A cached value with its storage and expiry times.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The cached value.
    pub value: V,
    /// When the value was stored.
    pub stored_at: Instant,
    /// `stored_at + ttl`.
    pub expires_at: Instant,
}

impl<V> CacheEntry<V> {
    /// Create an entry stored now. `ttl` is clamped to [`MAX_TTL`].
    pub fn new(value: V, ttl: Duration) -> Self {
        let stored_at = Instant::now();
        let ttl = ttl.min(MAX_TTL);
        Self {
            value,
            stored_at,
            expires_at: stored_at.checked_add(ttl).unwrap_or(stored_at),
        }
    }

    /// Whether the entry is still valid at `now`.
    pub fn is_valid_at(&self, now: Instant) -> bool {
        now <= self.expires_at
    }

    /// Whether the entry has expired at `now`.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        !self.is_valid_at(now)
    }
}

/// Entry counts reported by [`ResponseCache::status`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStatus {
    pub total: usize,
    pub valid: usize,
    pub expired: usize,
}

/// Thread-safe TTL cache keyed by caller-chosen strings.
///
/// Eviction is FIFO by insertion, independent of how often an entry is
/// read. Expired entries are dropped lazily by `get` and eagerly by
/// `cleanup`.
#[derive(Debug)]
pub struct ResponseCache<V> {
    entries: Mutex<LinkedHashMap<String, CacheEntry<V>>>,
    default_ttl: Duration,
    max_size: usize,
}

impl<V> ResponseCache<V> {
    /// Create a cache with the given default TTL and capacity (at least 1).
    pub fn new(default_ttl: Duration, max_size: usize) -> Self {
        Self {
            entries: Mutex::new(LinkedHashMap::new()),
            default_ttl,
            max_size: max_size.max(1),
        }
    }

    /// Create a cache from configuration.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.default_ttl(), config.max_size)
    }

    fn lock(&self) -> MutexGuard<'_, LinkedHashMap<String, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// TTL applied when `set` is given none.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Capacity before the oldest entry is evicted.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Store `value` under `key`, expiring after `ttl` or the default TTL.
    ///
    /// Re-setting an existing key counts as a fresh insertion.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        let key = key.into();
        let entry = CacheEntry::new(value, ttl.unwrap_or(self.default_ttl));

        let mut entries = self.lock();
        entries.remove(&key);
        entries.insert(key, entry);

        while entries.len() > self.max_size {
            if let Some((evicted, _)) = entries.pop_front() {
                debug!(key = %evicted, "evicted oldest cache entry");
            }
        }
    }

    /// Remove `key`. Returns whether it was present.
    pub fn delete(&self, key: &str) -> bool {
        self.lock().remove(key).is_some()
    }

    /// Remove every entry whose key starts with `prefix`. Returns the count removed.
    pub fn delete_pattern(&self, prefix: &str) -> usize {
        let mut entries = self.lock();
        let doomed: Vec<String> = entries
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();
        for key in &doomed {
            entries.remove(key);
        }
        doomed.len()
    }

    /// Remove every expired entry. Returns the count removed.
    pub fn cleanup(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.lock();
        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            entries.remove(key);
        }
        expired.len()
    }

    /// Count total, valid, and expired-but-present entries.
    pub fn status(&self) -> CacheStatus {
        let now = Instant::now();
        let entries = self.lock();
        let valid = entries
            .values()
            .filter(|entry| entry.is_valid_at(now))
            .count();
        CacheStatus {
            total: entries.len(),
            valid,
            expired: entries.len() - valid,
        }
    }

    /// Number of entries, expired ones included.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl<V: Clone> ResponseCache<V> {
    /// Return the value for `key` if present and unexpired.
    ///
    /// An expired entry is removed on the way out.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let mut entries = self.lock();
        let valid = entries.get(key)?.is_valid_at(now);
        if valid {
            entries.get(key).map(|entry| entry.value.clone())
        } else {
            entries.remove(key);
            None
        }
    }
}

impl<V: Send + 'static> ResponseCache<V> {
    /// Create a shared cache from configuration and start its background
    /// sweep when `cleanup_interval_secs` is non-zero.
    ///
    /// Must be called inside a tokio runtime. The sweep stops once the last
    /// `Arc` is dropped.
    pub fn shared(config: &CacheConfig) -> Arc<Self> {
        let cache = Arc::new(Self::from_config(config));
        if let Some(interval) = config.cleanup_interval() {
            cache.spawn_cleanup(interval);
        }
        cache
    }

    /// Run `cleanup` every `interval` on a background task.
    pub fn spawn_cleanup(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let cache = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(strong) = cache.upgrade() else {
                    break;
                };
                let removed = strong.cleanup();
                if removed > 0 {
                    debug!(removed, "swept expired cache entries");
                }
            }
        })
    }
}

impl<V> Default for ResponseCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_MAX_SIZE)
    }
}
