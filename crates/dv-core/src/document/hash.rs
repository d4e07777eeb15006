use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    Sha256V1,
}

/// Content digest used for integrity re-verification.
///
/// Hex-encoded so the value survives JSON persistence unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash {
    pub alg: HashAlgorithm,
    pub hex: String,
}

impl ContentHash {
    pub fn compute(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self {
            alg: HashAlgorithm::Sha256V1,
            hex: hex::encode(hasher.finalize()),
        }
    }

    /// Recomputes the digest over `bytes` and compares it to this hash.
    pub fn matches(&self, bytes: &[u8]) -> bool {
        *self == Self::compute(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_bytes_same_hash() {
        let a = ContentHash::compute(b"hello");
        let b = ContentHash::compute(b"hello");
        assert_eq!(a, b);
        assert!(a.matches(b"hello"));
    }

    #[test]
    fn test_different_bytes_differ() {
        let a = ContentHash::compute(b"hello");
        assert!(!a.matches(b"hell0"));
    }

    #[test]
    fn test_hex_is_64_chars() {
        assert_eq!(ContentHash::compute(b"x").hex.len(), 64);
    }
}
