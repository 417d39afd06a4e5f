//! Error types for keyforge-core

use thiserror::Error;

/// Result type alias for KeyForge operations
pub type Result<T> = std::result::Result<T, KeyforgeError>;

/// KeyForge error types
#[derive(Error, Debug)]
pub enum KeyforgeError {
    #[error("No wallet extension detected - install a browser wallet to continue")]
    ExtensionNotFound,

    #[error("No accounts found or access denied")]
    NoAccountsGranted,

    #[error("Failed to connect wallet: {0}")]
    ConnectionFailed(String),

    #[error("Wallet is not connected - connect a wallet first")]
    WalletNotConnected,

    #[error("Select at least one character type")]
    EmptyPool,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Failed to decode password {id}: {reason}")]
    DecodeFailed { id: String, reason: String },

    #[error("Ledger request failed: {0}")]
    TransportFailed(String),

    #[error("Encryption failed: {0}")]
    EncryptionError(String),

    #[error("Decryption failed: {0}")]
    DecryptionError(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivationError(String),

    #[error("Settings error: {0}")]
    SettingsError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl KeyforgeError {
    /// Build a decode failure for the given record id
    pub fn decode_failed(id: &str, reason: impl Into<String>) -> Self {
        Self::DecodeFailed {
            id: id.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether this error came from the ledger transport rather than local validation
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::TransportFailed(_))
    }
}
