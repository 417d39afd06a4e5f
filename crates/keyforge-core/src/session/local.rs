//! In-process wallet provider
//!
//! Stands in for a browser extension in tests and in the CLI. Signatures are
//! derived deterministically from a secret seed with Argon2id, so the same seed
//! always unlocks the same sealed payloads.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tracing::debug;

use super::provider::{EventHandler, SubscriptionId, WalletEvent, WalletProvider};
use crate::crypto::{derive_key, KeyDerivationParams, SecretString};
use crate::error::{KeyforgeError, Result};

#[derive(Debug)]
struct WalletState {
    accounts: Vec<String>,
    granted: bool,
    rejecting: bool,
    chain_id: String,
}

/// Wallet provider backed by a local seed
pub struct LocalWalletProvider {
    state: Mutex<WalletState>,
    handlers: Mutex<HashMap<u64, EventHandler>>,
    next_subscription: AtomicU64,
    seed: SecretString,
    kdf: KeyDerivationParams,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl LocalWalletProvider {
    /// A wallet holding `accounts` that has not granted access yet
    pub fn new(accounts: Vec<String>, seed: impl Into<SecretString>) -> Self {
        Self {
            state: Mutex::new(WalletState {
                accounts,
                granted: false,
                rejecting: false,
                chain_id: "0x1".to_string(),
            }),
            handlers: Mutex::new(HashMap::new()),
            next_subscription: AtomicU64::new(1),
            seed: seed.into(),
            kdf: KeyDerivationParams::interactive(),
        }
    }

    /// A wallet that already granted access to `accounts`
    pub fn granted(accounts: Vec<String>, seed: impl Into<SecretString>) -> Self {
        let provider = Self::new(accounts, seed);
        lock(&provider.state).granted = true;
        provider
    }

    /// Override the key derivation cost used for signatures
    pub fn with_kdf(mut self, kdf: KeyDerivationParams) -> Self {
        self.kdf = kdf;
        self
    }

    /// Make future access requests fail as if the user declined
    pub fn set_rejecting(&self, rejecting: bool) {
        lock(&self.state).rejecting = rejecting;
    }

    /// Replace the account list and notify subscribers
    pub fn set_accounts(&self, accounts: Vec<String>) {
        let visible = {
            let mut state = lock(&self.state);
            state.accounts = accounts;
            if state.granted {
                state.accounts.clone()
            } else {
                Vec::new()
            }
        };
        self.emit(WalletEvent::AccountsChanged(visible));
    }

    /// Switch chains and notify subscribers
    pub fn switch_chain(&self, chain_id: &str) {
        lock(&self.state).chain_id = chain_id.to_string();
        self.emit(WalletEvent::ChainChanged(chain_id.to_string()));
    }

    pub fn chain_id(&self) -> String {
        lock(&self.state).chain_id.clone()
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.handlers).len()
    }

    /// Deliver an event to every subscriber
    pub fn emit(&self, event: WalletEvent) {
        let handlers: Vec<EventHandler> = lock(&self.handlers).values().cloned().collect();
        debug!("Emitting {:?} to {} subscribers", event, handlers.len());
        for handler in handlers {
            handler(&event);
        }
    }
}

#[async_trait]
impl WalletProvider for LocalWalletProvider {
    async fn accounts(&self) -> Result<Vec<String>> {
        let state = lock(&self.state);
        Ok(if state.granted {
            state.accounts.clone()
        } else {
            Vec::new()
        })
    }

    async fn request_accounts(&self) -> Result<Vec<String>> {
        let mut state = lock(&self.state);
        if state.rejecting {
            return Err(KeyforgeError::ConnectionFailed(
                "User rejected the request".to_string(),
            ));
        }
        state.granted = true;
        Ok(state.accounts.clone())
    }

    async fn sign_message(&self, account: &str, message: &str) -> Result<String> {
        {
            let state = lock(&self.state);
            let known = state
                .accounts
                .iter()
                .any(|a| a.eq_ignore_ascii_case(account));
            if !state.granted || !known {
                return Err(KeyforgeError::ConnectionFailed(format!(
                    "account {} is not authorized",
                    account
                )));
            }
        }

        let salt = format!("{}:{}", account.to_lowercase(), message);
        let key = derive_key(self.seed.expose().as_bytes(), salt.as_bytes(), Some(self.kdf))?;
        Ok(format!("0x{}", hex::encode(key.as_bytes())))
    }

    fn subscribe(&self, handler: EventHandler) -> SubscriptionId {
        let id = self.next_subscription.fetch_add(1, Ordering::SeqCst);
        lock(&self.handlers).insert(id, handler);
        SubscriptionId(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        lock(&self.handlers).remove(&id.0);
    }
}
