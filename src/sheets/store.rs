// Document store abstraction.
// The narrow read/batch-write interface the sync layer needs from a spreadsheet.

use async_trait::async_trait;

use crate::error::Result;

use super::range::CellRange;
use super::types::{BatchUpdateAck, CellValues, PendingWrite};

/// Spreadsheet-backed document store bound to one spreadsheet.
///
/// Implementations perform a single request per call; pacing and quota
/// retries are the caller's job (see [`crate::limiter::RateLimiter`]).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read the cells of `range`. Trailing empty cells and rows may be omitted.
    async fn get(&self, range: &CellRange) -> Result<CellValues>;

    /// Apply every write in one batched request.
    async fn batch_update(&self, writes: &[PendingWrite]) -> Result<BatchUpdateAck>;
}
