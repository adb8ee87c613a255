use rust_decimal::Decimal;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Pending transaction pool is full ({capacity} transactions)")]
    PoolFull { capacity: usize },

    #[error("Insufficient funds: available after pending {available}, required {required}")]
    InsufficientFunds { available: Decimal, required: Decimal },

    #[error("Invalid amount: {0}")]
    InvalidAmount(Decimal),

    #[error("Invalid address: {0:?}")]
    InvalidAddress(String),

    #[error("Balance of {address} would leave the representable range")]
    BalanceOverflow { address: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LedgerError {
    /// Rejections a client can act on by waiting for the next block or
    /// changing the proposal; everything else is an environment problem.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            LedgerError::PoolFull { .. }
                | LedgerError::InsufficientFunds { .. }
                | LedgerError::InvalidAmount(_)
                | LedgerError::InvalidAddress(_)
                | LedgerError::BalanceOverflow { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_funds_message_names_both_amounts() {
        let err = LedgerError::InsufficientFunds {
            available: Decimal::new(4000, 2),
            required: Decimal::new(6000, 2),
        };
        let msg = err.to_string();
        assert!(msg.contains("40.00"));
        assert!(msg.contains("60.00"));
        assert!(err.is_rejection());
    }

    #[test]
    fn test_io_error_is_not_a_rejection() {
        let err = LedgerError::from(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert!(!err.is_rejection());
    }
}
