//! Wallet extension surface

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

/// Notifications pushed by the wallet extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    /// The exposed account list changed; the first entry is the active account
    AccountsChanged(Vec<String>),
    /// The wallet switched to another chain
    ChainChanged(String),
}

/// Callback registered for [`WalletEvent`]s
pub type EventHandler = Arc<dyn Fn(&WalletEvent) + Send + Sync>;

/// Handle returned by [`WalletProvider::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// A wallet holding the user's signing key
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Accounts already granted to this app, without prompting (`eth_accounts`)
    async fn accounts(&self) -> Result<Vec<String>>;

    /// Ask the user for account access (`eth_requestAccounts`)
    async fn request_accounts(&self) -> Result<Vec<String>>;

    /// Sign a text message with `account` (`personal_sign`)
    async fn sign_message(&self, account: &str, message: &str) -> Result<String>;

    /// Register an event handler
    fn subscribe(&self, handler: EventHandler) -> SubscriptionId;

    /// Remove a previously registered handler; unknown ids are ignored
    fn unsubscribe(&self, id: SubscriptionId);
}
