//! File-backed ledger
//!
//! Persists one account's password table as JSON, one file per account.
//! Every mutation rewrites the file atomically through a temp file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use super::book::LedgerBook;
use super::{Ledger, LedgerConnector, LedgerEntry};
use crate::error::{KeyforgeError, Result};

const FILE_VERSION: u32 = 1;

/// File format for a persisted ledger
#[derive(Debug, Serialize, Deserialize)]
struct LedgerFile {
    version: u32,
    account: String,
    book: LedgerBook,
}

/// One account's password table persisted to disk
pub struct FileLedger {
    path: PathBuf,
    account: String,
    book: RwLock<LedgerBook>,
}

impl FileLedger {
    /// Open the ledger file at `path`, starting empty if it does not exist
    pub async fn open(path: PathBuf, account: &str) -> Result<Self> {
        let book = if path.exists() {
            let contents = tokio::fs::read_to_string(&path).await?;
            let file: LedgerFile = serde_json::from_str(&contents)?;
            if file.version != FILE_VERSION {
                return Err(KeyforgeError::TransportFailed(format!(
                    "unsupported ledger file version {}",
                    file.version
                )));
            }
            debug!("Loaded {} ledger entries from {:?}", file.book.len(), path);
            file.book
        } else {
            debug!("No ledger file at {:?}, starting empty", path);
            LedgerBook::default()
        };

        Ok(Self {
            path,
            account: account.to_lowercase(),
            book: RwLock::new(book),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, book: &LedgerBook) -> Result<()> {
        let file = LedgerFile {
            version: FILE_VERSION,
            account: self.account.clone(),
            book: book.clone(),
        };
        let contents = serde_json::to_string_pretty(&file)?;

        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents).await?;
        tokio::fs::rename(&temp_path, &self.path).await?;

        debug!("Persisted ledger to {:?}", self.path);
        Ok(())
    }

    /// Apply a mutation and persist it; memory is rolled back if the write fails
    async fn mutate<F>(&self, apply: F) -> Result<()>
    where
        F: FnOnce(&mut LedgerBook) -> Result<()> + Send,
    {
        let mut book = self.book.write().await;
        let mut next = book.clone();
        apply(&mut next)?;
        self.persist(&next)
            .await
            .map_err(|e| KeyforgeError::TransportFailed(e.to_string()))?;
        *book = next;
        Ok(())
    }
}

#[async_trait]
impl Ledger for FileLedger {
    async fn add_password(&self, id: &str, encrypted_data: &str, category: &str) -> Result<()> {
        self.mutate(|book| book.add(id, encrypted_data, category)).await
    }

    async fn delete_password(&self, id: &str) -> Result<()> {
        self.mutate(|book| book.delete(id)).await
    }

    async fn get_all_password_ids(&self) -> Result<Vec<String>> {
        Ok(self.book.read().await.active_ids())
    }

    async fn get_password(&self, id: &str) -> Result<LedgerEntry> {
        self.book.read().await.get(id)
    }

    async fn password_exists(&self, id: &str) -> Result<bool> {
        Ok(self.book.read().await.exists(id))
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}

/// Directory of per-account [`FileLedger`]s
pub struct FileLedgerStore {
    dir: PathBuf,
    open: Mutex<HashMap<String, Arc<FileLedger>>>,
}

impl FileLedgerStore {
    /// Create a store rooted at `dir`, creating the directory if needed
    pub fn new(dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&dir)?;
        debug!("File ledger store at {:?}", dir);

        Ok(Self {
            dir,
            open: Mutex::new(HashMap::new()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn ledger_path(&self, account: &str) -> PathBuf {
        self.dir.join(format!("ledger-{}.json", account.to_lowercase()))
    }
}

#[async_trait]
impl LedgerConnector for FileLedgerStore {
    async fn connect(&self, account: &str) -> Result<Arc<dyn Ledger>> {
        let key = account.to_lowercase();
        let mut open = self.open.lock().await;

        if let Some(ledger) = open.get(&key) {
            let ledger: Arc<dyn Ledger> = ledger.clone();
            return Ok(ledger);
        }

        let ledger = Arc::new(FileLedger::open(self.ledger_path(account), account).await?);
        open.insert(key, ledger.clone());
        Ok(ledger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ledger.json");

        {
            let ledger = FileLedger::open(path.clone(), "0xAbC").await.unwrap();
            ledger.add_password("a-1", "payload-a", "Email").await.unwrap();
            ledger.add_password("b-2", "payload-b", "Work").await.unwrap();
            ledger.delete_password("a-1").await.unwrap();
        }

        let ledger = FileLedger::open(path, "0xabc").await.unwrap();
        assert_eq!(ledger.get_all_password_ids().await.unwrap(), vec!["b-2"]);
        assert_eq!(ledger.get_password("b-2").await.unwrap().encrypted_data, "payload-b");
        // deleted ids stay reserved after reload
        assert!(ledger.add_password("a-1", "again", "Email").await.is_err());
    }

    #[tokio::test]
    async fn test_rejected_call_leaves_file_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ledger.json");
        let ledger = FileLedger::open(path.clone(), "0xabc").await.unwrap();

        assert!(ledger.delete_password("missing").await.is_err());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_store_shares_ledger_per_account() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileLedgerStore::new(temp_dir.path().join("ledgers")).unwrap();

        let first = store.connect("0xAAAA").await.unwrap();
        first.add_password("x-1", "p", "Other").await.unwrap();

        let second = store.connect("0xaaaa").await.unwrap();
        assert!(second.password_exists("x-1").await.unwrap());
        assert!(store.dir().join("ledger-0xaaaa.json").exists());

        let other = store.connect("0xBBBB").await.unwrap();
        assert!(other.get_all_password_ids().await.unwrap().is_empty());
    }
}
