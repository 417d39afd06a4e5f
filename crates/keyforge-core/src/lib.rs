//! # keyforge-core
//!
//! Core of the KeyForge password manager:
//! - Password generation with a strength score
//! - Wallet session tracking with explicit event subscriptions
//! - A gateway that stores credential records on a ledger contract
//! - Reversible or AES-256-GCM sealed payload codecs

pub mod codec;
pub mod credential;
pub mod crypto;
pub mod error;
pub mod gateway;
pub mod generator;
pub mod ledger;
pub mod session;
pub mod settings;
mod vault;

pub use codec::{EncodedCodec, PayloadCodec, PayloadEncoding, SealedCodec};
pub use credential::{filter_records, Category, CredentialRecord, NewCredential};
pub use crypto::SecretString;
pub use error::{KeyforgeError, Result};
pub use gateway::{CredentialGateway, ListReport};
pub use generator::{classify, generate, GeneratorOptions, StrengthLevel};
pub use ledger::{FileLedgerStore, Ledger, LedgerConnector, MemoryChain};
pub use session::{format_short, LocalWalletProvider, SessionSignal, WalletProvider, WalletSession};
pub use settings::{Settings, SettingsManager};
pub use vault::{Vault, VaultState};
