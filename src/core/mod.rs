//! Core ledger components

pub mod balances;
pub mod block;
pub mod blockchain;
pub mod diagnostics;
pub mod ledger;
pub mod mempool;
pub mod transaction;

pub use balances::{BalanceTable, Settlement};
pub use block::{Block, BlockHeader};
pub use blockchain::Blockchain;
pub use diagnostics::Tamper;
pub use ledger::{ChainInfo, Ledger};
pub use mempool::Mempool;
pub use transaction::{Transaction, SYSTEM_SENDER};
