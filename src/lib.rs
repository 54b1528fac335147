// sheetsync
// Rate-limited document access, response caching, and incremental address geocoding.

//! Building blocks for an application whose records live in a spreadsheet:
//!
//! - [`limiter::RateLimiter`] spaces calls to a quota-limited API and retries
//!   quota rejections with capped exponential backoff.
//! - [`cache::ResponseCache`] keeps recent read results with a TTL and FIFO
//!   eviction; [`cache::CachedSheetReader`] puts both in front of a
//!   [`sheets::DocumentStore`].
//! - [`sync::GeocodingSyncPipeline`] keeps coordinate columns in step with
//!   address columns, geocoding only rows whose address changed and writing
//!   every update in one batch.

pub mod cache;
pub mod config;
pub mod error;
pub mod geocode;
pub mod limiter;
pub mod logging;
pub mod sheets;
pub mod sync;

pub use cache::{CachedSheetReader, ResponseCache};
pub use config::Config;
pub use error::{Result, SyncError};
pub use geocode::{Coordinates, Geocoder, HttpGeocoder, ResilientGeocoder};
pub use limiter::{RateLimiter, RetryPolicy};
pub use sheets::{DocumentStore, PendingWrite, SheetsClient};
pub use sync::{GeocodingSyncPipeline, HashStore, JsonFileHashStore, SyncReport, SyncTarget};
