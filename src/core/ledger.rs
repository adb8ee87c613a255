use crate::config::Config;
use crate::consensus::ChainIntegrityViolation;
use crate::core::balances::BalanceTable;
use crate::core::diagnostics::Tamper;
use crate::core::mempool::Mempool;
use crate::core::transaction::{has_valid_precision, is_system};
use crate::core::{Block, Blockchain, Transaction};
use crate::crypto::hash::{Digest, DigestAlgorithm};
use crate::mining::{Miner, MiningStats};
use crate::{LedgerError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainInfo {
    pub height: u64,
    pub genesis: Digest,
    pub tip: Digest,
    pub difficulty: usize,
    pub digest_algorithm: DigestAlgorithm,
    pub total_transactions: usize,
    /// `None` once the rewards ever issued no longer fit a `Decimal`.
    pub total_issued: Option<Decimal>,
    pub pending_transactions: usize,
}

/// The chain plus everything derived from it: the pending pool and the
/// settled balance table. All mutation goes through `&mut self`, so an
/// admission check and its insert can never interleave with another call.
pub struct Ledger {
    chain: Blockchain,
    mempool: Mempool,
    balances: BalanceTable,
    known_addresses: BTreeSet<String>,
    mining_reward: Decimal,
}

impl Ledger {
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let miner = Miner::new(config.mining.difficulty, config.mining.digest);
        Ok(Self::with_miner(config, miner))
    }

    fn with_miner(config: &Config, miner: Miner) -> Self {
        Self {
            chain: Blockchain::new(miner),
            mempool: Mempool::new(config.mempool.max_pending_transactions),
            balances: BalanceTable::new(),
            known_addresses: BTreeSet::new(),
            mining_reward: config.mining.reward,
        }
    }

    /// Queues a transfer if the pool has room and the sender can cover it
    /// from its settled balance minus what it already has pending. SYSTEM
    /// skips the funds check. Amounts finer than a cent are refused, as is
    /// anything that would push a balance out of range once the pool settles.
    pub fn propose_transaction(
        &mut self,
        sender: &str,
        recipient: &str,
        amount: Decimal,
    ) -> Result<&Transaction> {
        if self.mempool.is_full() {
            log::warn!("Pending transaction limit reached");
            return Err(LedgerError::PoolFull {
                capacity: self.mempool.capacity(),
            });
        }

        validate_address(sender)?;
        validate_address(recipient)?;
        if amount.is_sign_negative() || !has_valid_precision(amount) {
            return Err(LedgerError::InvalidAmount(amount));
        }

        if !is_system(sender) {
            let outflow = self
                .mempool
                .pending_outflow(sender)
                .ok_or_else(|| LedgerError::BalanceOverflow {
                    address: sender.to_string(),
                })?;
            let available = self.balances.balance(sender) - outflow;
            if available < amount {
                log::warn!(
                    "Insufficient funds for {} (available after pending: {}, required: {})",
                    sender,
                    available,
                    amount
                );
                return Err(LedgerError::InsufficientFunds {
                    available,
                    required: amount,
                });
            }
        }

        let tx = Transaction::new(sender, recipient, amount);
        let mut batch = self.mempool.snapshot();
        batch.push(tx.clone());
        if let Err(e) = self.balances.settle(&batch) {
            log::warn!("Rejected {}: {}", tx, e);
            return Err(e);
        }

        self.remember(&tx);
        let tx = self.mempool.push(tx);
        log::debug!("Transaction added: {}", tx);
        Ok(tx)
    }

    /// Mines the pool plus a SYSTEM reward to `miner_address`, settles the new
    /// block and empties the pool. The only path by which balances change.
    /// Settlement is computed before mining, so if the reward would overflow
    /// the miner's balance nothing is mined and the pool is kept.
    pub fn mine_pending(&mut self, miner_address: &str) -> Result<&Block> {
        validate_address(miner_address)?;

        log::info!("Mining new block with {} pending transactions", self.mempool.len());
        let mut transactions = self.mempool.snapshot();
        let reward = Transaction::new_reward(miner_address, self.mining_reward);
        transactions.push(reward.clone());
        let settlement = self.balances.settle(&transactions)?;

        let block = self.chain.append(transactions);
        log::debug!(
            "Settling {} transactions from block {}",
            block.transaction_count(),
            block.index()
        );
        self.balances.commit(settlement);
        self.remember(&reward);
        self.mempool.clear();

        Ok(self.chain.tip())
    }

    fn remember(&mut self, tx: &Transaction) {
        for address in [&tx.sender, &tx.recipient] {
            if !is_system(address) {
                self.known_addresses.insert(address.clone());
            }
        }
    }

    pub fn validate_chain(&self) -> std::result::Result<(), ChainIntegrityViolation> {
        let outcome = self.chain.validate();
        if let Err(violation) = &outcome {
            log::warn!("Blockchain is invalid: {}", violation);
        }
        outcome
    }

    pub fn balance_of(&self, address: &str) -> Decimal {
        self.balances.balance(address)
    }

    /// Every address that has appeared as sender or recipient of an accepted
    /// proposal or a mining reward, pending or settled. SYSTEM is not listed.
    pub fn list_known_addresses(&self) -> &BTreeSet<String> {
        &self.known_addresses
    }

    pub fn dump_chain(&self) -> &[Block] {
        self.chain.blocks()
    }

    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self.chain.blocks())?)
    }

    pub fn pending_transactions(&self) -> &[Transaction] {
        self.mempool.transactions()
    }

    pub fn chain(&self) -> &Blockchain {
        &self.chain
    }

    pub fn mining_reward(&self) -> Decimal {
        self.mining_reward
    }

    pub fn last_mining_stats(&self) -> Option<&MiningStats> {
        self.chain.last_mining_stats()
    }

    pub fn chain_info(&self) -> ChainInfo {
        let blocks = self.chain.blocks();
        ChainInfo {
            height: self.chain.height(),
            genesis: self.chain.genesis().digest().clone(),
            tip: self.chain.tip().digest().clone(),
            difficulty: self.chain.difficulty(),
            digest_algorithm: self.chain.algorithm(),
            total_transactions: blocks.iter().map(Block::transaction_count).sum(),
            total_issued: blocks
                .iter()
                .flat_map(Block::transactions)
                .filter(|tx| tx.is_reward())
                .try_fold(Decimal::ZERO, |total, tx| total.checked_add(tx.amount)),
            pending_transactions: self.mempool.len(),
        }
    }

    /// Diagnostic write access to committed blocks. Only for exercising
    /// [`Ledger::validate_chain`]; balances are not re-derived.
    pub fn diagnostics(&mut self) -> Tamper<'_> {
        Tamper::new(&mut self.chain)
    }
}

fn validate_address(address: &str) -> Result<()> {
    if address.trim().is_empty() {
        return Err(LedgerError::InvalidAddress(address.to_string()));
    }
    Ok(())
}
