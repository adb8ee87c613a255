use crate::consensus::validation::{ChainIntegrityViolation, ChainValidator};
use crate::core::{Block, Transaction};
use crate::crypto::hash::{Digest, DigestAlgorithm};
use crate::mining::{Miner, MiningStats};

/// Vec-backed chain: position `i` holds the block with index `i`, and there
/// is always at least the genesis block.
pub struct Blockchain {
    blocks: Vec<Block>,
    miner: Miner,
    last_stats: Option<MiningStats>,
}

impl Blockchain {
    /// Mines the genesis block with the supplied miner.
    pub fn new(miner: Miner) -> Self {
        log::info!("Mining genesis block...");
        let result = miner.mine(0, Vec::new(), Digest::genesis_sentinel());
        log::info!("Genesis block created: {}", result.block.digest());

        Self {
            blocks: vec![result.block],
            miner,
            last_stats: Some(result.stats),
        }
    }

    pub fn with_difficulty(difficulty: usize, algorithm: DigestAlgorithm) -> Self {
        Self::new(Miner::new(difficulty, algorithm))
    }

    /// Mines `transactions` into a block linked to the current tip. Never
    /// fails; an empty list still yields a valid block.
    pub fn append(&mut self, transactions: Vec<Transaction>) -> &Block {
        let index = self.blocks.len() as u64;
        let previous_digest = self.tip().digest().clone();

        let result = self.miner.mine(index, transactions, previous_digest);
        self.blocks.push(result.block);
        self.last_stats = Some(result.stats);

        log::info!("Block {} added to blockchain", index);
        self.tip()
    }

    pub fn validate(&self) -> Result<(), ChainIntegrityViolation> {
        let algorithm = self.miner.algorithm();
        ChainValidator::new(&algorithm).validate(&self.blocks)
    }

    pub fn tip(&self) -> &Block {
        // The genesis block is pushed in `new` and blocks are never removed.
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn genesis(&self) -> &Block {
        &self.blocks[0]
    }

    pub fn get_block(&self, index: u64) -> Option<&Block> {
        usize::try_from(index).ok().and_then(|i| self.blocks.get(i))
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Index of the tip block.
    pub fn height(&self) -> u64 {
        self.tip().index()
    }

    pub fn difficulty(&self) -> usize {
        self.miner.difficulty()
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.miner.algorithm()
    }

    pub fn last_mining_stats(&self) -> Option<&MiningStats> {
        self.last_stats.as_ref()
    }

    pub(crate) fn blocks_mut(&mut self) -> &mut [Block] {
        &mut self.blocks
    }

    pub(crate) fn miner(&self) -> &Miner {
        &self.miner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::ViolationKind;
    use rust_decimal::Decimal;

    fn chain() -> Blockchain {
        Blockchain::with_difficulty(1, DigestAlgorithm::Djb2)
    }

    #[test]
    fn test_genesis_block() {
        let chain = chain();
        let genesis = chain.genesis();

        assert_eq!(chain.len(), 1);
        assert_eq!(chain.height(), 0);
        assert_eq!(genesis.index(), 0);
        assert!(genesis.transactions().is_empty());
        assert_eq!(genesis.previous_digest().as_str(), "0");
        assert!(genesis.digest().meets_difficulty(1));
        assert!(chain.validate().is_ok());
    }

    #[test]
    fn test_append_links_to_tip() {
        let mut chain = chain();
        let genesis_digest = chain.tip().digest().clone();

        let block = chain.append(vec![Transaction::new_reward("miner", Decimal::new(10, 0))]);
        assert_eq!(block.index(), 1);
        assert_eq!(block.previous_digest(), &genesis_digest);

        let second = chain.append(Vec::new()).clone();
        assert_eq!(second.index(), 2);
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.get_block(1).map(|b| b.digest()), Some(second.previous_digest()));
        assert!(chain.get_block(3).is_none());
    }

    #[test]
    fn test_indices_are_positions() {
        let mut chain = chain();
        for _ in 0..4 {
            chain.append(Vec::new());
        }

        for (position, block) in chain.blocks().iter().enumerate() {
            assert_eq!(block.index(), position as u64);
        }
        assert!(chain.validate().is_ok());
    }

    #[test]
    fn test_validate_reports_tampered_block() {
        let mut chain = chain();
        chain.append(vec![Transaction::new("a", "b", Decimal::new(1, 0))]);
        chain.append(Vec::new());

        chain.blocks_mut()[1].transactions_mut()[0].recipient = "mallory".to_string();

        let violation = chain.validate().unwrap_err();
        assert_eq!(violation.kind, ViolationKind::DigestMismatch);
        assert_eq!(violation.index, 1);
        // Still browsable after a failed audit.
        assert_eq!(chain.len(), 3);
    }

    #[test]
    fn test_last_mining_stats_track_latest_block() {
        let mut chain = chain();
        chain.append(Vec::new());
        let stats = chain.last_mining_stats().unwrap();
        assert_eq!(stats.attempts, chain.tip().nonce() + 1);
        assert_eq!(stats.difficulty, 1);
    }
}
