// Address change-detection hashing.

use sha2::{Digest, Sha256};

/// Hex characters kept from the digest.
const HASH_LEN: usize = 16;

/// Short digest of address text, insensitive to surrounding and repeated whitespace.
pub fn address_hash(address: &str) -> String {
    let canonical = address.split_whitespace().collect::<Vec<_>>().join(" ");
    let digest = Sha256::digest(canonical.as_bytes());
    let mut hex = hex::encode(digest);
    hex.truncate(HASH_LEN);
    hex
}
