//! Ledger contract surface

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// What `getPassword` returns for an id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub encrypted_data: String,
    pub category: String,
}

/// The password contract, bound to one account's signing session
///
/// Mutating calls return once the submission is final. Failures of any kind
/// surface as `TransportFailed` with the underlying message.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// `addPassword(id, encryptedData, category)`
    async fn add_password(&self, id: &str, encrypted_data: &str, category: &str) -> Result<()>;

    /// `deletePassword(id)` - unmarks the record; the id stays reserved
    async fn delete_password(&self, id: &str) -> Result<()>;

    /// `getAllPasswordIds()`
    async fn get_all_password_ids(&self) -> Result<Vec<String>>;

    /// `getPassword(id)`
    async fn get_password(&self, id: &str) -> Result<LedgerEntry>;

    /// `passwordExists(id)`
    async fn password_exists(&self, id: &str) -> Result<bool>;

    /// Human-readable backend name
    fn backend_name(&self) -> &'static str;
}

/// Produces the ledger view for a connected account
#[async_trait]
pub trait LedgerConnector: Send + Sync {
    async fn connect(&self, account: &str) -> Result<Arc<dyn Ledger>>;
}
