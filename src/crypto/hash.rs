//! Deterministic block digests.
//!
//! Every digest renders as a fixed-width, zero-padded, lowercase hex string so
//! a difficulty target is a plain prefix check. None of the algorithms here
//! are relied on for security.

use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use std::fmt;

/// Previous-digest value stored in the genesis block.
pub const GENESIS_PREVIOUS_DIGEST: &str = "0";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Digest(String);

impl Digest {
    pub fn genesis_sentinel() -> Self {
        Self(GENESIS_PREVIOUS_DIGEST.to_string())
    }

    pub fn from_hex(hex_str: impl Into<String>) -> Self {
        Self(hex_str.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn leading_zeros(&self) -> usize {
        self.0.chars().take_while(|c| *c == '0').count()
    }

    pub fn meets_difficulty(&self, difficulty: usize) -> bool {
        self.0.len() >= difficulty && self.0.as_bytes()[..difficulty].iter().all(|b| *b == b'0')
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Digest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

pub trait Hasher {
    fn hash(&self, data: &[u8]) -> Digest;

    /// Length of every digest this hasher produces.
    fn hex_width(&self) -> usize;
}

/// Bernstein's `h * 33 + c` string hash over 64 bits, passed through the
/// MurmurHash3 64-bit finalizer.
/// Raw djb2 leaves the leading hex digits almost fixed while only trailing
/// payload bytes (the nonce) change; the finalizer spreads them over all bits.
#[derive(Debug, Clone, Copy, Default)]
pub struct Djb2;

impl Djb2 {
    pub fn raw(data: &[u8]) -> u64 {
        data.iter().fold(5381u64, |h, &c| {
            (h << 5).wrapping_add(h).wrapping_add(c as u64)
        })
    }

    /// `fmix64`; a bijection, so it adds no collisions.
    pub fn finalize(mut k: u64) -> u64 {
        k ^= k >> 33;
        k = k.wrapping_mul(0xff51_afd7_ed55_8ccd);
        k ^= k >> 33;
        k = k.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
        k ^= k >> 33;
        k
    }
}

impl Hasher for Djb2 {
    fn hash(&self, data: &[u8]) -> Digest {
        Digest(format!("{:016x}", Self::finalize(Self::raw(data))))
    }

    fn hex_width(&self) -> usize {
        16
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl Hasher for Sha256Hasher {
    fn hash(&self, data: &[u8]) -> Digest {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Digest(hex::encode(hasher.finalize()))
    }

    fn hex_width(&self) -> usize {
        64
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    #[default]
    Djb2,
    Sha256,
}

impl Hasher for DigestAlgorithm {
    fn hash(&self, data: &[u8]) -> Digest {
        match self {
            DigestAlgorithm::Djb2 => Djb2.hash(data),
            DigestAlgorithm::Sha256 => Sha256Hasher.hash(data),
        }
    }

    fn hex_width(&self) -> usize {
        match self {
            DigestAlgorithm::Djb2 => Djb2.hex_width(),
            DigestAlgorithm::Sha256 => Sha256Hasher.hex_width(),
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DigestAlgorithm::Djb2 => write!(f, "djb2"),
            DigestAlgorithm::Sha256 => write!(f, "sha256"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_djb2_known_values() {
        assert_eq!(Djb2::raw(b""), 5381);
        // 5381 * 33 + 'a'
        assert_eq!(Djb2::raw(b"a"), 177670);
        assert_eq!(Djb2.hash(b"").as_str(), "5b4e6934d821b2f8");
    }

    #[test]
    fn test_hash_is_deterministic_and_fixed_width() {
        for algorithm in [DigestAlgorithm::Djb2, DigestAlgorithm::Sha256] {
            let first = algorithm.hash(b"hello world");
            let second = algorithm.hash(b"hello world");
            assert_eq!(first, second);
            assert_eq!(first.as_str().len(), algorithm.hex_width());
            assert_ne!(first, algorithm.hash(b"hello worle"));
        }
    }

    #[test]
    fn test_digest_is_lowercase_hex() {
        let digest = DigestAlgorithm::Sha256.hash(b"test");
        assert!(digest
            .as_str()
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_difficulty_prefix() {
        let digest = Digest::from_hex("000a1f");
        assert_eq!(digest.leading_zeros(), 3);
        assert!(digest.meets_difficulty(0));
        assert!(digest.meets_difficulty(3));
        assert!(!digest.meets_difficulty(4));
        assert!(!Digest::from_hex("00").meets_difficulty(3));
    }

    #[test]
    fn test_algorithm_serializes_lowercase() {
        let json = serde_json::to_string(&DigestAlgorithm::Sha256).unwrap();
        assert_eq!(json, "\"sha256\"");
        let parsed: DigestAlgorithm = serde_json::from_str("\"djb2\"").unwrap();
        assert_eq!(parsed, DigestAlgorithm::Djb2);
    }
}
