//! Deterministic cache key generation.
//!
//! Composite lookups (decision caching across several arguments) hash a
//! canonical rendering of the ordered parts so the same logical query always
//! lands on the same key, independent of caller formatting.

use sha2::{Digest, Sha256};

/// Unit separator keeps `["ab","c"]` and `["a","bc"]` distinct.
const PART_SEPARATOR: u8 = 0x1f;

/// Hashes an ordered list of key parts into a stable hex key.
pub fn composite_key(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update([PART_SEPARATOR]);
    }
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composite_key_is_deterministic() {
        let k1 = composite_key(&["emp-1", "emp-2", "read"]);
        let k2 = composite_key(&["emp-1", "emp-2", "read"]);
        assert_eq!(k1, k2);
        assert_eq!(k1.len(), 64, "sha-256 hex digest");
    }

    #[test]
    fn test_part_boundaries_matter() {
        assert_ne!(
            composite_key(&["ab", "c"]),
            composite_key(&["a", "bc"]),
            "concatenation across part boundaries must not collide"
        );
    }

}
