//! Tallychain - A single-node proof-of-work ledger
//!
//! This library implements:
//! - Deterministic block digests with a leading-zero difficulty target
//! - Exhaustive nonce search (proof of work) and a Vec-backed block chain
//! - Chain integrity auditing that reports the first broken digest or link
//! - A bounded pending pool with overdraft-aware admission
//! - Balances derived only from settled blocks
//! - An interactive CLI shell

pub mod cli;
pub mod config;
pub mod consensus;
pub mod core;
pub mod crypto;
pub mod error;
pub mod mining;

pub use crate::core::Ledger;
pub use config::Config;
pub use error::{LedgerError, Result};
