use crate::core::Transaction;
use rust_decimal::Decimal;

/// Bounded, arrival-ordered pool of transactions waiting for a block.
#[derive(Debug, Clone)]
pub struct Mempool {
    transactions: Vec<Transaction>,
    capacity: usize,
}

impl Mempool {
    pub fn new(capacity: usize) -> Self {
        Self {
            transactions: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.transactions.len() >= self.capacity
    }

    /// Sum of pooled amounts already committed by `sender`, or `None` if the
    /// sum leaves the representable range.
    pub fn pending_outflow(&self, sender: &str) -> Option<Decimal> {
        self.transactions
            .iter()
            .filter(|tx| tx.sender == sender)
            .try_fold(Decimal::ZERO, |total, tx| total.checked_add(tx.amount))
    }

    /// Caller checks capacity first; the pool only keeps order.
    pub(crate) fn push(&mut self, tx: Transaction) -> &Transaction {
        self.transactions.push(tx);
        &self.transactions[self.transactions.len() - 1]
    }

    pub fn snapshot(&self) -> Vec<Transaction> {
        self.transactions.clone()
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub(crate) fn clear(&mut self) {
        self.transactions.clear();
    }
}
