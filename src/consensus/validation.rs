use crate::core::Block;
use crate::crypto::hash::Hasher;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationKind {
    /// Block content no longer hashes to its stored digest.
    DigestMismatch,
    /// Block's previous digest does not name its predecessor.
    LinkMismatch,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::DigestMismatch => write!(f, "invalid hash"),
            ViolationKind::LinkMismatch => write!(f, "invalid previous hash"),
        }
    }
}

/// First integrity failure found by [`ChainValidator::validate`]. A detection
/// result: the chain it describes stays loaded and readable.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{kind} at block #{index} (stored: {stored}, expected: {expected})")]
pub struct ChainIntegrityViolation {
    pub index: u64,
    pub kind: ViolationKind,
    pub stored: String,
    pub expected: String,
}

#[derive(Clone, Copy)]
pub struct ChainValidator<'a> {
    hasher: &'a dyn Hasher,
}

impl<'a> ChainValidator<'a> {
    pub fn new(hasher: &'a dyn Hasher) -> Self {
        Self { hasher }
    }

    /// Walks adjacent pairs from genesis to tip. For each pair the successor's
    /// digest is recomputed first, then its link to the predecessor checked.
    pub fn validate(&self, blocks: &[Block]) -> Result<(), ChainIntegrityViolation> {
        log::debug!("Validating chain of {} blocks", blocks.len());

        for pair in blocks.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            self.validate_digest(next)?;
            self.validate_link(prev, next)?;
        }

        log::debug!("Chain validation successful");
        Ok(())
    }

    pub fn validate_digest(&self, block: &Block) -> Result<(), ChainIntegrityViolation> {
        let expected = block.recompute_digest(self.hasher);
        if block.digest() != &expected {
            return Err(ChainIntegrityViolation {
                index: block.index(),
                kind: ViolationKind::DigestMismatch,
                stored: block.digest().to_string(),
                expected: expected.to_string(),
            });
        }
        Ok(())
    }

    pub fn validate_link(&self, prev: &Block, next: &Block) -> Result<(), ChainIntegrityViolation> {
        if next.previous_digest() != prev.digest() {
            return Err(ChainIntegrityViolation {
                index: next.index(),
                kind: ViolationKind::LinkMismatch,
                stored: next.previous_digest().to_string(),
                expected: prev.digest().to_string(),
            });
        }
        Ok(())
    }
}
