// Sync module.
// Change detection, hash persistence, and the geocoding sync pipeline.

pub mod hash;
pub mod hash_store;
pub mod notify;
pub mod pipeline;
pub mod report;
pub mod target;

pub use hash::address_hash;
pub use hash_store::{AddressHashes, HashStore, JsonFileHashStore, MemoryHashStore};
pub use notify::{LogSink, NotificationField, NotificationSink};
pub use pipeline::{GeocodingSyncPipeline, RowAction};
pub use report::{RowOutcome, RowResult, SyncReport};
pub use target::{AddressRow, StatusRule, SyncTarget};
