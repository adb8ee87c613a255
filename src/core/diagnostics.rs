//! Diagnostic write access to committed blocks.
//!
//! Blocks are immutable once mined; everything in this module deliberately
//! breaks that so the integrity audit can be exercised. Nothing on the normal
//! ledger path calls into it.

use crate::core::{Blockchain, Transaction};
use crate::crypto::hash::Digest;
use rust_decimal::Decimal;

/// One-shot handle: each method consumes it, so take a fresh one from
/// [`crate::core::Ledger::diagnostics`] per change.
pub struct Tamper<'a> {
    chain: &'a mut Blockchain,
}

impl<'a> Tamper<'a> {
    pub(crate) fn new(chain: &'a mut Blockchain) -> Self {
        Self { chain }
    }

    /// Raw access to a committed block's transactions. The stored digest is
    /// left as it was.
    pub fn transactions_mut(self, index: u64) -> Option<&'a mut Vec<Transaction>> {
        let chain = self.chain;
        let position = usize::try_from(index).ok()?;
        chain
            .blocks_mut()
            .get_mut(position)
            .map(|block| block.transactions_mut())
    }

    /// Adds `delta` to the first transaction of the tip block. Returns the
    /// tampered block's index, or `None` when the tip is genesis or empty.
    pub fn inflate_latest(self, delta: Decimal) -> Option<u64> {
        let index = self.chain.height();
        if index == 0 {
            return None;
        }

        let tx = self.transactions_mut(index)?.first_mut()?;
        tx.amount += delta;

        log::warn!("Block {} tampered: first transaction amount raised by {}", index, delta);
        Some(index)
    }

    /// Points a block at a different predecessor and re-does its proof of
    /// work, so its own digest stays consistent and only the link is broken.
    /// Returns false when the index is out of range.
    pub fn relink(self, index: u64, previous_digest: Digest) -> bool {
        let chain = self.chain;
        let Some(position) = usize::try_from(index).ok().filter(|p| *p < chain.len()) else {
            return false;
        };

        let (transactions, created_at) = {
            let block = &chain.blocks()[position];
            (block.transactions().to_vec(), block.created_at())
        };

        let resealed = chain
            .miner()
            .mine_at(index, transactions, previous_digest, created_at)
            .block;

        log::warn!(
            "Block {} relinked to {} and resealed as {}",
            index,
            resealed.previous_digest(),
            resealed.digest()
        );
        chain.blocks_mut()[position] = resealed;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::ViolationKind;
    use crate::crypto::hash::DigestAlgorithm;

    fn chain_with_blocks(extra: usize) -> Blockchain {
        let mut chain = Blockchain::with_difficulty(1, DigestAlgorithm::Djb2);
        for _ in 0..extra {
            chain.append(vec![Transaction::new_reward("miner", Decimal::new(10, 0))]);
        }
        chain
    }

    #[test]
    fn test_inflate_latest_skips_genesis() {
        let mut chain = chain_with_blocks(0);
        assert_eq!(Tamper::new(&mut chain).inflate_latest(Decimal::ONE), None);
        assert!(chain.validate().is_ok());
    }

    #[test]
    fn test_inflate_latest_breaks_digest() {
        let mut chain = chain_with_blocks(2);
        let tampered = Tamper::new(&mut chain).inflate_latest(Decimal::new(99999, 2));

        assert_eq!(tampered, Some(2));
        assert_eq!(chain.tip().transactions()[0].amount, Decimal::new(100999, 2));
        let violation = chain.validate().unwrap_err();
        assert_eq!(violation.kind, ViolationKind::DigestMismatch);
        assert_eq!(violation.index, 2);
    }

    #[test]
    fn test_relink_breaks_only_the_link() {
        let mut chain = chain_with_blocks(3);
        let forged = Digest::from_hex("0123456789abcdef");

        assert!(Tamper::new(&mut chain).relink(2, forged.clone()));

        let block = chain.get_block(2).unwrap();
        assert_eq!(block.previous_digest(), &forged);
        assert_eq!(&block.recompute_digest(&DigestAlgorithm::Djb2), block.digest());

        let violation = chain.validate().unwrap_err();
        assert_eq!(violation.kind, ViolationKind::LinkMismatch);
        assert_eq!(violation.index, 2);
        assert_eq!(violation.stored, forged.to_string());
        assert_eq!(violation.expected, chain.get_block(1).unwrap().digest().to_string());
    }

    #[test]
    fn test_relink_out_of_range() {
        let mut chain = chain_with_blocks(1);
        assert!(!Tamper::new(&mut chain).relink(5, Digest::genesis_sentinel()));
        assert!(Tamper::new(&mut chain).transactions_mut(5).is_none());
    }
}
