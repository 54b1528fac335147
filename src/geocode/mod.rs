// Geocoding module.
// Normalizes addresses and resolves them to coordinates through an external service.

pub mod client;
pub mod normalize;
pub mod types;

pub use client::{Geocoder, HttpGeocoder, ResilientGeocoder};
pub use normalize::normalize_address;
pub use types::Coordinates;
