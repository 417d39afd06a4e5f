//! Wallet session state
//!
//! Tracks the single active account. State snapshots are published on a
//! `watch` channel; events pushed by the provider are queued on an `mpsc`
//! channel and applied when the owner drains them.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use super::provider::{EventHandler, SubscriptionId, WalletEvent, WalletProvider};
use crate::error::{KeyforgeError, Result};

/// Connection status of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Disconnected,
    Connecting,
    Connected,
}

/// Snapshot of the session; an address is present iff connected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    address: Option<String>,
    status: SessionStatus,
}

impl SessionState {
    pub fn disconnected() -> Self {
        Self {
            address: None,
            status: SessionStatus::Disconnected,
        }
    }

    pub fn connecting() -> Self {
        Self {
            address: None,
            status: SessionStatus::Connecting,
        }
    }

    pub fn connected(address: String) -> Self {
        Self {
            address: Some(address),
            status: SessionStatus::Connected,
        }
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }
}

/// What the owner must do after an event was applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionSignal {
    /// The active account changed (or was cleared)
    AccountChanged(Option<String>),
    /// The chain changed; all application state must be reloaded
    ReloadRequired { chain_id: String },
}

/// The process-wide wallet session, owned by the application
pub struct WalletSession {
    provider: Option<Arc<dyn WalletProvider>>,
    state: watch::Sender<SessionState>,
    events: mpsc::UnboundedReceiver<WalletEvent>,
    subscription: Option<SubscriptionId>,
}

impl WalletSession {
    /// Create a session; `None` means no wallet extension is installed
    pub fn new(provider: Option<Arc<dyn WalletProvider>>) -> Self {
        let (tx, events) = mpsc::unbounded_channel();

        let subscription = provider.as_ref().map(|provider| {
            let handler: EventHandler = Arc::new(move |event: &WalletEvent| {
                // receiver gone means the session is shutting down
                let _ = tx.send(event.clone());
            });
            provider.subscribe(handler)
        });

        let (state, _) = watch::channel(SessionState::disconnected());

        Self {
            provider,
            state,
            events,
            subscription,
        }
    }

    pub fn has_extension(&self) -> bool {
        self.provider.is_some()
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn address(&self) -> Option<String> {
        self.state.borrow().address.clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.state.borrow().status
    }

    pub fn is_connected(&self) -> bool {
        self.status() == SessionStatus::Connected
    }

    /// Subscribe to state snapshots
    pub fn watch(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// The provider, for signing requests
    pub fn provider(&self) -> Option<&Arc<dyn WalletProvider>> {
        self.provider.as_ref()
    }

    /// Request account access and adopt the first granted account
    pub async fn connect(&mut self) -> Result<String> {
        let provider = self
            .provider
            .clone()
            .ok_or(KeyforgeError::ExtensionNotFound)?;

        let previous = self.state();
        self.set_state(SessionState::connecting());

        let accounts = match provider.request_accounts().await {
            Ok(accounts) => accounts,
            Err(err) => {
                self.set_state(previous);
                warn!("Wallet connection rejected: {}", err);
                return Err(match err {
                    KeyforgeError::ConnectionFailed(_) => err,
                    other => KeyforgeError::ConnectionFailed(other.to_string()),
                });
            }
        };

        match accounts.into_iter().next() {
            Some(account) => {
                info!("Connected to account: {}", format_short(&account));
                self.set_state(SessionState::connected(account.clone()));
                Ok(account)
            }
            None => {
                self.set_state(previous);
                Err(KeyforgeError::NoAccountsGranted)
            }
        }
    }

    /// Forget the active account locally; the wallet keeps its permission
    pub fn disconnect(&mut self) {
        if self.is_connected() {
            info!("Wallet disconnected");
        }
        self.set_state(SessionState::disconnected());
    }

    /// Adopt an already-granted account without prompting
    ///
    /// Returns `None` when no extension is installed or nothing is granted.
    pub async fn current_account(&mut self) -> Result<Option<String>> {
        let Some(provider) = self.provider.clone() else {
            debug!("No wallet extension installed");
            return Ok(None);
        };

        let accounts = provider.accounts().await?;
        match accounts.into_iter().next() {
            Some(account) => {
                debug!("Found an authorized account: {}", format_short(&account));
                self.set_state(SessionState::connected(account.clone()));
                Ok(Some(account))
            }
            None => {
                debug!("No authorized account found");
                Ok(None)
            }
        }
    }

    /// Apply one pushed event
    pub fn handle_event(&mut self, event: WalletEvent) -> SessionSignal {
        match event {
            WalletEvent::AccountsChanged(accounts) => {
                let next = accounts.into_iter().next();
                match &next {
                    Some(account) => {
                        info!("Active account changed to {}", format_short(account));
                        self.set_state(SessionState::connected(account.clone()));
                    }
                    None => {
                        info!("Wallet exposed no accounts, clearing session");
                        self.set_state(SessionState::disconnected());
                    }
                }
                SessionSignal::AccountChanged(next)
            }
            WalletEvent::ChainChanged(chain_id) => {
                info!("Chain changed to {}, reloading", chain_id);
                self.set_state(SessionState::disconnected());
                SessionSignal::ReloadRequired { chain_id }
            }
        }
    }

    /// Apply every queued event without waiting
    pub fn poll_events(&mut self) -> Vec<SessionSignal> {
        let mut signals = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            signals.push(self.handle_event(event));
        }
        signals
    }

    /// Wait for the next pushed event and apply it
    pub async fn next_signal(&mut self) -> Option<SessionSignal> {
        let event = self.events.recv().await?;
        Some(self.handle_event(event))
    }

    /// Unsubscribe from the provider; called automatically on drop
    pub fn close(&mut self) {
        if let (Some(provider), Some(id)) = (&self.provider, self.subscription.take()) {
            provider.unsubscribe(id);
            debug!("Unsubscribed from wallet events");
        }
    }

    fn set_state(&self, state: SessionState) {
        self.state.send_replace(state);
    }
}

impl Drop for WalletSession {
    fn drop(&mut self) {
        self.close();
    }
}

/// Shorten an address for display: first 6 and last 4 characters
pub fn format_short(address: &str) -> String {
    if address.is_empty() {
        return String::new();
    }

    let chars: Vec<char> = address.chars().collect();
    let head: String = chars.iter().take(6).collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("{}...{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::LocalWalletProvider;

    const ALICE: &str = "0xA11CE00000000000000000000000000000000001";
    const BOB: &str = "0xB0B0000000000000000000000000000000000002";

    fn provider(accounts: &[&str]) -> Arc<LocalWalletProvider> {
        Arc::new(LocalWalletProvider::new(
            accounts.iter().map(|a| a.to_string()).collect(),
            "seed",
        ))
    }

    #[test]
    fn test_format_short() {
        assert_eq!(format_short("0x1234567890abcdef"), "0x1234...cdef");
        assert_eq!(format_short(""), "");
        assert_eq!(format_short("0x12"), "0x12...0x12");
    }

    #[tokio::test]
    async fn test_connect_without_extension() {
        let mut session = WalletSession::new(None);
        assert!(matches!(session.connect().await, Err(KeyforgeError::ExtensionNotFound)));
        assert_eq!(session.current_account().await.unwrap(), None);
        assert_eq!(session.state(), SessionState::disconnected());
    }

    #[tokio::test]
    async fn test_connect_adopts_first_account() {
        let mut session = WalletSession::new(Some(provider(&[ALICE, BOB])));

        assert_eq!(session.connect().await.unwrap(), ALICE);
        assert_eq!(session.status(), SessionStatus::Connected);
        assert_eq!(session.address().as_deref(), Some(ALICE));

        session.disconnect();
        assert_eq!(session.state(), SessionState::disconnected());
    }

    #[tokio::test]
    async fn test_connect_with_no_accounts() {
        let mut session = WalletSession::new(Some(provider(&[])));
        assert!(matches!(session.connect().await, Err(KeyforgeError::NoAccountsGranted)));
        assert_eq!(session.status(), SessionStatus::Disconnected);
    }

    #[tokio::test]
    async fn test_connect_rejected() {
        let wallet = provider(&[ALICE]);
        wallet.set_rejecting(true);
        let mut session = WalletSession::new(Some(wallet));

        assert!(matches!(session.connect().await, Err(KeyforgeError::ConnectionFailed(_))));
        assert_eq!(session.address(), None);
    }

    #[tokio::test]
    async fn test_current_account_reads_granted_accounts_only() {
        let wallet = provider(&[ALICE]);
        let mut session = WalletSession::new(Some(wallet.clone()));
        assert_eq!(session.current_account().await.unwrap(), None);

        wallet.request_accounts().await.unwrap();
        assert_eq!(session.current_account().await.unwrap().as_deref(), Some(ALICE));
        assert!(session.is_connected());
    }

    #[tokio::test]
    async fn test_pushed_events_update_state() {
        let wallet = provider(&[ALICE, BOB]);
        let mut session = WalletSession::new(Some(wallet.clone()));
        session.connect().await.unwrap();
        let watcher = session.watch();

        wallet.set_accounts(vec![BOB.to_string()]);
        assert_eq!(
            session.poll_events(),
            vec![SessionSignal::AccountChanged(Some(BOB.to_string()))]
        );
        assert_eq!(watcher.borrow().address(), Some(BOB));

        wallet.set_accounts(Vec::new());
        wallet.switch_chain("0x5");
        assert_eq!(
            session.poll_events(),
            vec![
                SessionSignal::AccountChanged(None),
                SessionSignal::ReloadRequired {
                    chain_id: "0x5".to_string()
                },
            ]
        );
        assert_eq!(session.state(), SessionState::disconnected());
        assert!(session.poll_events().is_empty());
    }

    #[tokio::test]
    async fn test_next_signal_waits_for_event() {
        let wallet = provider(&[ALICE]);
        let mut session = WalletSession::new(Some(wallet.clone()));
        session.connect().await.unwrap();

        wallet.switch_chain("0x1");
        assert_eq!(
            session.next_signal().await,
            Some(SessionSignal::ReloadRequired {
                chain_id: "0x1".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_drop_unsubscribes() {
        let wallet = provider(&[ALICE]);
        let session = WalletSession::new(Some(wallet.clone()));
        assert_eq!(wallet.subscriber_count(), 1);

        drop(session);
        assert_eq!(wallet.subscriber_count(), 0);
    }
}
