// src/core/hash.rs

use sha2::{Digest as _, Sha256};

/// Lowercase hex rendering of a SHA256 digest (64 characters).
pub type Digest = String;

/// Computes the SHA256 hash of the given data, rendered as lowercase hex.
pub fn sha256_hex(data: &[u8]) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Computes the SHA256 hash of a list of byte slices concatenated together.
pub fn sha256_hex_concat(data_slices: &[&[u8]]) -> Digest {
    let mut hasher = Sha256::new();
    for slice in data_slices {
        hasher.update(slice);
    }
    hex::encode(hasher.finalize())
}

/// Combines two node digests into their parent.
///
/// The parent is the hash of the two hex strings concatenated, left first.
pub fn hash_pair(left: &str, right: &str) -> Digest {
    sha256_hex_concat(&[left.as_bytes(), right.as_bytes()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex() {
        let expected_hash = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";
        assert_eq!(sha256_hex(b"hello world"), expected_hash);
    }

    #[test]
    fn test_sha256_hex_concat() {
        let expected_hash = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";
        assert_eq!(sha256_hex_concat(&[b"hello", b" world"]), expected_hash);
    }

    #[test]
    fn test_hash_pair_is_string_concatenation() {
        let left = sha256_hex(b"a");
        let right = sha256_hex(b"b");
        let joined = format!("{}{}", left, right);
        assert_eq!(hash_pair(&left, &right), sha256_hex(joined.as_bytes()));
        assert_ne!(hash_pair(&left, &right), hash_pair(&right, &left));
    }

    #[test]
    fn test_digest_is_lowercase_hex() {
        let digest = sha256_hex(b"2025-01:150.00");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }
}
