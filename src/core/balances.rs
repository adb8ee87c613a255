use crate::core::Transaction;
use crate::{LedgerError, Result};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Per-address balances derived from settled blocks.
#[derive(Debug, Clone, Default)]
pub struct BalanceTable {
    balances: BTreeMap<String, Decimal>,
}

/// New balances for every address a batch of transactions touches, computed
/// against a [`BalanceTable`] but not yet written to it.
#[derive(Debug)]
pub struct Settlement {
    touched: BTreeMap<String, Decimal>,
}

impl BalanceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance(&self, address: &str) -> Decimal {
        self.balances.get(address).copied().unwrap_or(Decimal::ZERO)
    }

    /// Debits each sender unless it is SYSTEM and credits each recipient, in
    /// order. Fails without side effects if any balance would overflow.
    pub fn settle(&self, transactions: &[Transaction]) -> Result<Settlement> {
        let mut touched: BTreeMap<String, Decimal> = BTreeMap::new();

        for tx in transactions {
            if !tx.is_reward() {
                let sender = touched
                    .entry(tx.sender.clone())
                    .or_insert_with(|| self.balance(&tx.sender));
                *sender = sender
                    .checked_sub(tx.amount)
                    .ok_or_else(|| overflow(&tx.sender))?;
            }

            let recipient = touched
                .entry(tx.recipient.clone())
                .or_insert_with(|| self.balance(&tx.recipient));
            *recipient = recipient
                .checked_add(tx.amount)
                .ok_or_else(|| overflow(&tx.recipient))?;
        }

        Ok(Settlement { touched })
    }

    pub fn commit(&mut self, settlement: Settlement) {
        self.balances.extend(settlement.touched);
    }
}

fn overflow(address: &str) -> LedgerError {
    LedgerError::BalanceOverflow {
        address: address.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_address_is_zero() {
        let table = BalanceTable::new();
        assert_eq!(table.balance("nobody"), Decimal::ZERO);
    }

    fn apply(table: &mut BalanceTable, tx: Transaction) {
        let settlement = table.settle(&[tx]).unwrap();
        table.commit(settlement);
    }

    #[test]
    fn test_reward_credits_without_debit() {
        let mut table = BalanceTable::new();
        apply(&mut table, Transaction::new_reward("miner", Decimal::new(10, 0)));

        assert_eq!(table.balance("miner"), Decimal::new(10, 0));
    }

    #[test]
    fn test_transfer_moves_amount() {
        let mut table = BalanceTable::new();
        apply(&mut table, Transaction::new_reward("alice", Decimal::new(100, 0)));
        apply(&mut table, Transaction::new("alice", "bob", Decimal::new(2575, 2)));

        assert_eq!(table.balance("alice"), Decimal::new(7425, 2));
        assert_eq!(table.balance("bob"), Decimal::new(2575, 2));
    }

    #[test]
    fn test_settle_chains_within_batch() {
        let table = BalanceTable::new();
        let settlement = table
            .settle(&[
                Transaction::new_reward("alice", Decimal::new(5, 0)),
                Transaction::new("alice", "bob", Decimal::new(5, 0)),
            ])
            .unwrap();

        assert_eq!(settlement.touched["alice"], Decimal::ZERO);
        assert_eq!(settlement.touched["bob"], Decimal::new(5, 0));
        assert_eq!(table.balance("bob"), Decimal::ZERO);
    }

    #[test]
    fn test_overflow_leaves_table_untouched() {
        let mut table = BalanceTable::new();
        apply(&mut table, Transaction::new_reward("alice", Decimal::MAX));

        let err = table
            .settle(&[
                Transaction::new_reward("bob", Decimal::ONE),
                Transaction::new_reward("alice", Decimal::ONE),
            ])
            .unwrap_err();

        assert!(matches!(err, LedgerError::BalanceOverflow { ref address } if address == "alice"));
        assert_eq!(table.balance("alice"), Decimal::MAX);
        assert_eq!(table.balance("bob"), Decimal::ZERO);
    }
}
