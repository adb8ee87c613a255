use crate::core::block::{Block, BlockHeader, PayloadTemplate};
use crate::core::Transaction;
use crate::crypto::hash::{Digest, DigestAlgorithm, Hasher};
use crate::mining::difficulty::DifficultyTarget;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiningStats {
    /// Digests computed, including the winning one.
    pub attempts: u64,
    pub elapsed: Duration,
    pub difficulty: usize,
}

impl MiningStats {
    pub fn hashrate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.attempts as f64 / secs
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone)]
pub struct MiningResult {
    pub block: Block,
    pub stats: MiningStats,
}

/// Receives a report for every block the miner finds. Purely informational.
pub trait MiningObserver {
    fn block_mined(&self, block: &Block, stats: &MiningStats);
}

/// Default observer: reports through the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl MiningObserver for LogObserver {
    fn block_mined(&self, block: &Block, stats: &MiningStats) {
        log::info!(
            "Block mined: {} (index {}, nonce {}, {} attempts, {:.2} H/s)",
            block.digest(),
            block.index(),
            block.nonce(),
            stats.attempts,
            stats.hashrate()
        );
    }
}

/// Exhaustive nonce search over a fixed difficulty and digest algorithm.
pub struct Miner {
    target: DifficultyTarget,
    algorithm: DigestAlgorithm,
    observer: Box<dyn MiningObserver>,
}

impl Miner {
    pub fn new(difficulty: usize, algorithm: DigestAlgorithm) -> Self {
        Self {
            target: DifficultyTarget::new(difficulty),
            algorithm,
            observer: Box::new(LogObserver),
        }
    }

    pub fn with_observer(mut self, observer: Box<dyn MiningObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn difficulty(&self) -> usize {
        self.target.zeros
    }

    pub fn target(&self) -> DifficultyTarget {
        self.target
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Fixes the timestamp once, then walks nonces from zero until the digest
    /// meets the target. There is no iteration cap.
    pub fn mine(&self, index: u64, transactions: Vec<Transaction>, previous_digest: Digest) -> MiningResult {
        let created_at = Utc::now().timestamp() as u64;
        self.mine_at(index, transactions, previous_digest, created_at)
    }

    pub(crate) fn mine_at(
        &self,
        index: u64,
        transactions: Vec<Transaction>,
        previous_digest: Digest,
        created_at: u64,
    ) -> MiningResult {
        log::debug!(
            "Mining block {} over {} transactions at difficulty {}",
            index,
            transactions.len(),
            self.target.zeros
        );

        let start_time = Instant::now();
        let mut template = PayloadTemplate::new(index, &previous_digest, created_at, &transactions);
        let mut nonce = 0u64;

        let digest = loop {
            let digest = self.algorithm.hash(template.with_nonce(nonce).as_bytes());
            if self.target.is_met_by(&digest) {
                break digest;
            }
            nonce += 1;
        };

        let stats = MiningStats {
            attempts: nonce + 1,
            elapsed: start_time.elapsed(),
            difficulty: self.target.zeros,
        };

        let block = Block::from_parts(
            BlockHeader {
                index,
                previous_digest,
                created_at,
                nonce,
                digest,
            },
            transactions,
        );

        self.observer.block_mined(&block, &stats);

        MiningResult { block, stats }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder(Rc<RefCell<Vec<Digest>>>);

    impl MiningObserver for Recorder {
        fn block_mined(&self, block: &Block, _stats: &MiningStats) {
            self.0.borrow_mut().push(block.digest().clone());
        }
    }

    #[test]
    fn test_difficulty_zero_takes_first_nonce() {
        let miner = Miner::new(0, DigestAlgorithm::Djb2);
        let result = miner.mine(0, Vec::new(), Digest::genesis_sentinel());

        assert_eq!(result.block.nonce(), 0);
        assert_eq!(result.stats.attempts, 1);
    }

    #[test]
    fn test_mined_digest_meets_target_and_recomputes() {
        for algorithm in [DigestAlgorithm::Djb2, DigestAlgorithm::Sha256] {
            let miner = Miner::new(2, algorithm);
            let transactions = vec![Transaction::new("alice", "bob", Decimal::new(125, 1))];
            let result = miner.mine(1, transactions, Digest::from_hex("00ab"));
            let block = &result.block;

            assert!(block.digest().as_str().starts_with("00"));
            assert_eq!(&block.recompute_digest(&algorithm), block.digest());
            assert_eq!(result.stats.attempts, block.nonce() + 1);
            assert_eq!(block.index(), 1);
            assert_eq!(block.previous_digest().as_str(), "00ab");
        }
    }

    #[test]
    fn test_first_satisfying_nonce_is_chosen() {
        let miner = Miner::new(1, DigestAlgorithm::Djb2);
        let previous = Digest::genesis_sentinel();
        let result = miner.mine_at(4, Vec::new(), previous.clone(), 1_700_000_000);

        for nonce in 0..result.block.nonce() {
            let payload = Block::digest_payload(4, &previous, 1_700_000_000, nonce, &[]);
            assert!(!DigestAlgorithm::Djb2.hash(payload.as_bytes()).meets_difficulty(1));
        }
    }

    #[test]
    fn test_observer_notified_once_per_block() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let miner = Miner::new(1, DigestAlgorithm::Djb2).with_observer(Box::new(Recorder(seen.clone())));

        let result = miner.mine(0, Vec::new(), Digest::genesis_sentinel());

        assert_eq!(seen.borrow().as_slice(), &[result.block.digest().clone()]);
    }
}
