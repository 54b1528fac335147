// Cached, rate-limited sheet reads.
// Cache first; on a miss, read through the limiter and populate the cache.

use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::limiter::RateLimiter;
use crate::sheets::range::quote_sheet_name;
use crate::sheets::{CellRange, CellValues, DocumentStore};

use super::store::ResponseCache;

/// Prefix of every key this reader stores.
const KEY_PREFIX: &str = "sheet:";

/// Read path for request handlers sharing one store, limiter, and cache.
pub struct CachedSheetReader {
    store: Arc<dyn DocumentStore>,
    limiter: Arc<RateLimiter>,
    cache: Arc<ResponseCache<CellValues>>,
}

impl CachedSheetReader {
    /// Create a reader over shared store, limiter, and cache.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        limiter: Arc<RateLimiter>,
        cache: Arc<ResponseCache<CellValues>>,
    ) -> Self {
        Self {
            store,
            limiter,
            cache,
        }
    }

    /// Cache key for a range.
    pub fn cache_key(range: &CellRange) -> String {
        format!("{}{}", KEY_PREFIX, range)
    }

    /// Read `range`, serving from cache while the entry is valid.
    pub async fn read(&self, range: &CellRange) -> Result<CellValues> {
        let key = Self::cache_key(range);
        if let Some(values) = self.cache.get(&key) {
            debug!(%key, "cache hit");
            return Ok(values);
        }

        debug!(%key, "cache miss");
        let values = self.limiter.execute(|| self.store.get(range)).await?;
        self.cache.set(key, values.clone(), None);
        Ok(values)
    }

    /// Drop one cached range, e.g. after writing to it.
    pub fn invalidate(&self, range: &CellRange) -> bool {
        self.cache.delete(&Self::cache_key(range))
    }

    /// Drop every cached range of one sheet.
    pub fn invalidate_sheet(&self, sheet: &str) -> usize {
        let prefix = format!("{}{}!", KEY_PREFIX, quote_sheet_name(sheet));
        self.cache.delete_pattern(&prefix)
    }
}
