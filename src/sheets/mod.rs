// Spreadsheet document store module.
// Provides A1 ranges, the store trait, and the values API client.

pub mod client;
pub mod range;
pub mod store;
pub mod types;

pub use client::SheetsClient;
pub use range::{CellRange, Column};
pub use store::DocumentStore;
pub use types::{BatchUpdateAck, CellValues, PendingWrite};
