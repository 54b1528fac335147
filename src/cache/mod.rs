// Cache module.
// In-process response caching for expensive document reads, plus local data paths.

pub mod paths;
pub mod reader;
pub mod store;

pub use reader::CachedSheetReader;
pub use store::{CacheEntry, CacheStatus, DEFAULT_MAX_SIZE, DEFAULT_TTL, MAX_TTL, ResponseCache};
