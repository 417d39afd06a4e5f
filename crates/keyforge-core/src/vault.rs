//! Vault orchestration
//!
//! Ties the wallet session, the ledger connector and the settings together.
//! Credential storage is only reachable while a wallet account is connected.

use std::sync::Arc;

use tracing::{debug, info};

use crate::codec::{vault_key_message, EncodedCodec, PayloadCodec, PayloadEncoding, SealedCodec};
use crate::credential::{filter_records, CredentialRecord, NewCredential};
use crate::crypto::KeyDerivationParams;
use crate::error::{KeyforgeError, Result};
use crate::gateway::{CredentialGateway, ListReport};
use crate::generator::{self, GeneratorOptions, StrengthLevel};
use crate::ledger::LedgerConnector;
use crate::session::{format_short, SessionSignal, WalletSession};
use crate::settings::Settings;

/// Vault state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaultState {
    /// No account connected; storage is gated
    Disconnected,
    /// Storage is open for this account
    Connected { account: String },
}

/// Application-level entry point
pub struct Vault {
    session: WalletSession,
    connector: Arc<dyn LedgerConnector>,
    settings: Settings,
    kdf: Option<KeyDerivationParams>,
    gateway: Option<CredentialGateway>,
    account: Option<String>,
}

impl Vault {
    pub fn new(session: WalletSession, connector: Arc<dyn LedgerConnector>, settings: Settings) -> Self {
        Self {
            session,
            connector,
            settings,
            kdf: None,
            gateway: None,
            account: None,
        }
    }

    /// Override the Argon2 cost used to derive sealed-payload keys
    pub fn with_kdf(mut self, kdf: KeyDerivationParams) -> Self {
        self.kdf = Some(kdf);
        self
    }

    pub fn state(&self) -> VaultState {
        match (&self.gateway, &self.account) {
            (Some(_), Some(account)) => VaultState::Connected {
                account: account.clone(),
            },
            _ => VaultState::Disconnected,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.gateway.is_some()
    }

    pub fn session(&self) -> &WalletSession {
        &self.session
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Connected account, shortened for display
    pub fn short_account(&self) -> String {
        self.account.as_deref().map(format_short).unwrap_or_default()
    }

    /// Prompt the wallet for access and open storage for the granted account
    pub async fn connect(&mut self) -> Result<String> {
        let account = self.session.connect().await?;
        self.open_for(&account).await?;
        Ok(account)
    }

    /// Reopen storage for an already-granted account, without prompting
    pub async fn resume(&mut self) -> Result<Option<String>> {
        match self.session.current_account().await? {
            Some(account) => {
                self.open_for(&account).await?;
                Ok(Some(account))
            }
            None => Ok(None),
        }
    }

    /// Close storage and forget the account locally
    pub fn disconnect(&mut self) {
        self.close_gateway();
        self.session.disconnect();
    }

    /// Apply queued wallet events and follow them
    ///
    /// Every queued event is applied to the session first; storage then follows
    /// the session's final account (or closes when the wallet exposes none). A
    /// chain change drops everything and re-adopts the already-granted account.
    pub async fn process_wallet_events(&mut self) -> Result<Vec<SessionSignal>> {
        let signals = self.session.poll_events();
        if signals.is_empty() {
            return Ok(signals);
        }

        let reload = signals.iter().any(|signal| match signal {
            SessionSignal::ReloadRequired { chain_id } => {
                debug!("Reloading vault for chain {}", chain_id);
                true
            }
            SessionSignal::AccountChanged(_) => false,
        });

        if reload {
            self.close_gateway();
            if !self.session.is_connected() {
                self.session.current_account().await?;
            }
        }

        match self.session.address() {
            Some(account) if reload || self.account.as_deref() != Some(account.as_str()) => {
                self.open_for(&account).await?;
            }
            Some(_) => {}
            None => self.close_gateway(),
        }

        Ok(signals)
    }

    /// Unsubscribe from the wallet and drop key material
    pub fn close(&mut self) {
        self.close_gateway();
        self.session.close();
    }

    /// Generate a password with the configured defaults
    pub fn generate(&self) -> Result<String> {
        generator::generate(&self.settings.generator)
    }

    pub fn generate_with(&self, options: &GeneratorOptions) -> Result<String> {
        generator::generate(options)
    }

    pub fn strength(&self, secret: &str) -> StrengthLevel {
        StrengthLevel::of(secret)
    }

    pub async fn add(&self, credential: NewCredential) -> Result<String> {
        self.gateway()?.add(credential).await
    }

    pub async fn get(&self, id: &str) -> Result<CredentialRecord> {
        self.gateway()?.get(id).await
    }

    pub async fn list(&self) -> Result<Vec<CredentialRecord>> {
        self.gateway()?.list().await
    }

    pub async fn list_detailed(&self) -> Result<ListReport> {
        self.gateway()?.list_detailed().await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.gateway()?.delete(id).await
    }

    pub async fn exists(&self, id: &str) -> Result<bool> {
        self.gateway()?.exists(id).await
    }

    /// List and filter by name, username or category
    pub async fn search(&self, query: &str) -> Result<Vec<CredentialRecord>> {
        let records = self.list().await?;
        Ok(filter_records(&records, query).into_iter().cloned().collect())
    }

    fn gateway(&self) -> Result<&CredentialGateway> {
        self.gateway.as_ref().ok_or(KeyforgeError::WalletNotConnected)
    }

    async fn open_for(&mut self, account: &str) -> Result<()> {
        self.close_gateway();

        let opened = async {
            let ledger = self.connector.connect(account).await?;
            let codec = self.codec_for(account).await?;
            Ok::<_, KeyforgeError>(CredentialGateway::new(ledger, codec))
        }
        .await;

        match opened {
            Ok(gateway) => {
                info!(
                    "Vault open for {} ({} ledger, {} payloads)",
                    format_short(account),
                    gateway.backend_name(),
                    gateway.codec_name()
                );
                self.gateway = Some(gateway);
                self.account = Some(account.to_string());
                Ok(())
            }
            Err(err) => {
                self.session.disconnect();
                Err(err)
            }
        }
    }

    async fn codec_for(&self, account: &str) -> Result<Arc<dyn PayloadCodec>> {
        match self.settings.payload_encoding {
            PayloadEncoding::Encoded => Ok(Arc::new(EncodedCodec::new())),
            PayloadEncoding::Sealed => {
                let provider = self
                    .session
                    .provider()
                    .ok_or(KeyforgeError::ExtensionNotFound)?;
                let signature = provider
                    .sign_message(account, &vault_key_message(account))
                    .await?;
                Ok(Arc::new(SealedCodec::from_signature(account, &signature, self.kdf)?))
            }
        }
    }

    fn close_gateway(&mut self) {
        if self.gateway.take().is_some() {
            debug!("Vault closed");
        }
        self.account = None;
    }
}
