//! Content addressing.
//!
//! Every identifier in an encoded record is the lowercase hex SHA-256 of some
//! canonical byte form: raw bytes for artifacts, the postcard encoding of the
//! node record for Nodes.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of `bytes`.
pub fn content_hash(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
