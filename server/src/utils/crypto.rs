//! Hashing helpers

use sha2::{Digest, Sha256};

/// SHA-256 digest as a lowercase hex string
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}
