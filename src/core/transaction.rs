use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reserved sender identity for mining rewards. Always solvent.
pub const SYSTEM_SENDER: &str = "SYSTEM";

/// Decimal places an amount is rendered with inside a block digest, and the
/// finest precision a proposal may carry.
pub const AMOUNT_DIGEST_SCALE: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    pub amount: Decimal,
    pub created_at: u64,
}

impl Transaction {
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>, amount: Decimal) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            amount,
            created_at: Utc::now().timestamp() as u64,
        }
    }

    pub fn new_reward(miner_address: impl Into<String>, reward: Decimal) -> Self {
        Self::new(SYSTEM_SENDER, miner_address, reward)
    }

    pub fn is_reward(&self) -> bool {
        is_system(&self.sender)
    }

    /// Appends this transaction's digest fields in their fixed order:
    /// sender, recipient, amount, timestamp. Each field is length-prefixed so
    /// no two distinct transactions share a payload.
    pub fn write_digest_payload(&self, out: &mut String) {
        write_field(out, &self.sender);
        write_field(out, &self.recipient);
        write_field(out, &digest_amount(self.amount));
        write_field(out, &self.created_at.to_string());
    }
}

/// Two decimal places, or every significant digit when the amount is finer
/// than that.
fn digest_amount(amount: Decimal) -> String {
    let normalized = amount.normalize();
    if normalized.scale() <= AMOUNT_DIGEST_SCALE {
        format!("{:.*}", AMOUNT_DIGEST_SCALE as usize, normalized)
    } else {
        normalized.to_string()
    }
}

/// Whether `amount` fits the precision amounts are committed with.
pub fn has_valid_precision(amount: Decimal) -> bool {
    amount.normalize().scale() <= AMOUNT_DIGEST_SCALE
}

/// Netstring-style `len:value,` field.
pub(crate) fn write_field(out: &mut String, value: &str) {
    use std::fmt::Write;

    // Writing into a String cannot fail.
    let _ = write!(out, "{}:{},", value.len(), value);
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}: {}", self.sender, self.recipient, self.amount)
    }
}

pub fn is_system(address: &str) -> bool {
    address == SYSTEM_SENDER
}
