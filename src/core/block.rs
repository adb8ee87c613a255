use crate::core::transaction::write_field;
use crate::core::Transaction;
use crate::crypto::hash::{Digest, Hasher};
use serde::{Deserialize, Serialize};

/// A mined block. Fields are fixed once mining returns; the only write path
/// afterwards is [`crate::core::diagnostics::Tamper`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    header: BlockHeader,
    transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub index: u64,
    pub previous_digest: Digest,
    pub created_at: u64,
    pub nonce: u64,
    pub digest: Digest,
}

impl Block {
    pub(crate) fn from_parts(header: BlockHeader, transactions: Vec<Transaction>) -> Self {
        Self {
            header,
            transactions,
        }
    }

    /// Serializes the digest fields in their fixed order: index, previous
    /// digest, timestamp, nonce, then every transaction, each field written
    /// as `len:value,`.
    pub fn digest_payload(
        index: u64,
        previous_digest: &Digest,
        created_at: u64,
        nonce: u64,
        transactions: &[Transaction],
    ) -> String {
        let mut payload = PayloadTemplate::new(index, previous_digest, created_at, transactions);
        payload.with_nonce(nonce).to_string()
    }

    /// Re-derives the digest from the fields as they are stored right now,
    /// ignoring the stored digest.
    pub fn recompute_digest(&self, hasher: &dyn Hasher) -> Digest {
        let payload = Self::digest_payload(
            self.header.index,
            &self.header.previous_digest,
            self.header.created_at,
            self.header.nonce,
            &self.transactions,
        );
        hasher.hash(payload.as_bytes())
    }

    pub fn index(&self) -> u64 {
        self.header.index
    }

    pub fn digest(&self) -> &Digest {
        &self.header.digest
    }

    pub fn previous_digest(&self) -> &Digest {
        &self.header.previous_digest
    }

    pub fn nonce(&self) -> u64 {
        self.header.nonce
    }

    pub fn created_at(&self) -> u64 {
        self.header.created_at
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    pub(crate) fn transactions_mut(&mut self) -> &mut Vec<Transaction> {
        &mut self.transactions
    }
}

/// Payload with everything but the nonce rendered once, so the nonce search
/// only formats the part that changes.
pub(crate) struct PayloadTemplate {
    prefix: String,
    suffix: String,
    buffer: String,
}

impl PayloadTemplate {
    pub(crate) fn new(
        index: u64,
        previous_digest: &Digest,
        created_at: u64,
        transactions: &[Transaction],
    ) -> Self {
        let mut prefix = String::new();
        write_field(&mut prefix, &index.to_string());
        write_field(&mut prefix, previous_digest.as_str());
        write_field(&mut prefix, &created_at.to_string());

        let mut suffix = String::new();
        for tx in transactions {
            tx.write_digest_payload(&mut suffix);
        }

        Self {
            buffer: String::with_capacity(prefix.len() + suffix.len() + 20),
            prefix,
            suffix,
        }
    }

    pub(crate) fn with_nonce(&mut self, nonce: u64) -> &str {
        self.buffer.clear();
        self.buffer.push_str(&self.prefix);
        write_field(&mut self.buffer, &nonce.to_string());
        self.buffer.push_str(&self.suffix);
        &self.buffer
    }
}
