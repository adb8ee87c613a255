use crate::core::transaction::has_valid_precision;
use crate::crypto::hash::{DigestAlgorithm, Hasher};
use crate::{LedgerError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub mining: MiningConfig,
    #[serde(default)]
    pub mempool: MempoolConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MiningConfig {
    /// Leading zero hex characters a block digest must carry.
    #[serde(default = "default_difficulty")]
    pub difficulty: usize,
    #[serde(default = "default_reward")]
    pub reward: Decimal,
    #[serde(default)]
    pub digest: DigestAlgorithm,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MempoolConfig {
    #[serde(default = "default_max_pending")]
    pub max_pending_transactions: usize,
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            difficulty: default_difficulty(),
            reward: default_reward(),
            digest: DigestAlgorithm::default(),
        }
    }
}

impl Default for MempoolConfig {
    fn default() -> Self {
        Self {
            max_pending_transactions: default_max_pending(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mining: MiningConfig::default(),
            mempool: MempoolConfig::default(),
        }
    }
}

fn default_difficulty() -> usize {
    4
}

fn default_reward() -> Decimal {
    Decimal::new(1000, 2) // 10.00
}

fn default_max_pending() -> usize {
    10
}

impl Config {
    /// Cheap settings for tests and demos: one leading zero, default pool.
    pub fn testing() -> Self {
        Self {
            mining: MiningConfig {
                difficulty: 1,
                ..MiningConfig::default()
            },
            mempool: MempoolConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.mempool.max_pending_transactions == 0 {
            return Err(LedgerError::Config(
                "mempool.max_pending_transactions must be at least 1".to_string(),
            ));
        }

        if self.mining.reward.is_sign_negative() || !has_valid_precision(self.mining.reward) {
            return Err(LedgerError::Config(format!(
                "mining.reward must be a non-negative amount in whole cents (got {})",
                self.mining.reward
            )));
        }

        let width = self.mining.digest.hex_width();
        if self.mining.difficulty > width {
            return Err(LedgerError::Config(format!(
                "mining.difficulty {} exceeds the {}-character {} digest",
                self.mining.difficulty, width, self.mining.digest
            )));
        }

        Ok(())
    }

    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Ok(Self::load_from(&config_path)?)
        } else {
            let config = Self::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    pub fn config_path() -> PathBuf {
        let home_dir = env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home_dir).join(".tallychain").join("config.json")
    }
}
