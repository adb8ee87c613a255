//! Digest primitives for Tallychain

pub mod hash;

pub use hash::{Digest, DigestAlgorithm, Djb2, Hasher, Sha256Hasher};
