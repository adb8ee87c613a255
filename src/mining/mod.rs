//! Proof-of-work mining for Tallychain

pub mod difficulty;
pub mod miner;

pub use difficulty::DifficultyTarget;
pub use miner::{LogObserver, Miner, MiningObserver, MiningResult, MiningStats};
