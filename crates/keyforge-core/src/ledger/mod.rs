//! Ledger backends for credential persistence
//!
//! The [`Ledger`] trait mirrors the password contract. Two in-process backends
//! implement the same contract semantics:
//! 1. In memory, per account ([`MemoryChain`])
//! 2. JSON files, per account ([`FileLedgerStore`])

mod book;
mod file;
mod memory;
mod traits;

pub use file::{FileLedger, FileLedgerStore};
pub use memory::{InMemoryLedger, MemoryChain};
pub use traits::{Ledger, LedgerConnector, LedgerEntry};
