//! In-process ledger backend

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::book::LedgerBook;
use super::{Ledger, LedgerConnector, LedgerEntry};
use crate::error::Result;

/// One account's password table held in memory
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    book: RwLock<LedgerBook>,
    requests: AtomicUsize,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of contract calls served so far
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn count(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Ledger for InMemoryLedger {
    async fn add_password(&self, id: &str, encrypted_data: &str, category: &str) -> Result<()> {
        self.count();
        self.book.write().await.add(id, encrypted_data, category)
    }

    async fn delete_password(&self, id: &str) -> Result<()> {
        self.count();
        self.book.write().await.delete(id)
    }

    async fn get_all_password_ids(&self) -> Result<Vec<String>> {
        self.count();
        Ok(self.book.read().await.active_ids())
    }

    async fn get_password(&self, id: &str) -> Result<LedgerEntry> {
        self.count();
        self.book.read().await.get(id)
    }

    async fn password_exists(&self, id: &str) -> Result<bool> {
        self.count();
        Ok(self.book.read().await.exists(id))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

/// In-process chain holding one [`InMemoryLedger`] per account
#[derive(Debug, Default)]
pub struct MemoryChain {
    accounts: RwLock<HashMap<String, Arc<InMemoryLedger>>>,
}

impl MemoryChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// The ledger for `account`, created on first use
    pub async fn ledger_for(&self, account: &str) -> Arc<InMemoryLedger> {
        let key = account.to_lowercase();
        let mut accounts = self.accounts.write().await;
        accounts
            .entry(key)
            .or_insert_with(|| {
                debug!("Opened in-memory ledger for {}", account);
                Arc::new(InMemoryLedger::new())
            })
            .clone()
    }
}

#[async_trait]
impl LedgerConnector for MemoryChain {
    async fn connect(&self, account: &str) -> Result<Arc<dyn Ledger>> {
        let ledger: Arc<dyn Ledger> = self.ledger_for(account).await;
        Ok(ledger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_contract_calls() {
        let ledger = InMemoryLedger::new();
        ledger.add_password("mail-1", "cGF5bG9hZA==", "Email").await.unwrap();

        assert!(ledger.password_exists("mail-1").await.unwrap());
        assert_eq!(ledger.get_all_password_ids().await.unwrap(), vec!["mail-1"]);
        assert_eq!(
            ledger.get_password("mail-1").await.unwrap(),
            LedgerEntry {
                encrypted_data: "cGF5bG9hZA==".to_string(),
                category: "Email".to_string(),
            }
        );

        ledger.delete_password("mail-1").await.unwrap();
        assert!(!ledger.password_exists("mail-1").await.unwrap());
        assert_eq!(ledger.request_count(), 6);
    }

    #[tokio::test]
    async fn test_accounts_are_isolated() {
        let chain = MemoryChain::new();
        let alice = chain.connect("0xAAAA").await.unwrap();
        let bob = chain.connect("0xBBBB").await.unwrap();

        alice.add_password("a-1", "p", "Work").await.unwrap();

        assert!(bob.get_all_password_ids().await.unwrap().is_empty());
        let again = chain.connect("0xaaaa").await.unwrap();
        assert_eq!(again.get_all_password_ids().await.unwrap(), vec!["a-1"]);
    }
}
