use sha2::{Digest, Sha256};

/// Length of a hashed cell in hex characters
pub const HASH_HEX_LEN: usize = 64;

/// SHA-256 fingerprint of a cell value as lowercase hex
/// Deterministic and one-way; used for joins, never reversed
pub fn hash_value(value: &[u8]) -> String {
    hex::encode(Sha256::digest(value))
}
