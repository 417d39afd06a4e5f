//! Payload codecs
//!
//! A codec packs a [`CredentialPayload`] into the single string field the ledger
//! accepts, and unpacks it again. [`EncodedCodec`] is a reversible encoding with
//! no confidentiality; [`SealedCodec`] encrypts with a wallet-derived key.

mod encoded;
mod sealed;

use serde::{Deserialize, Serialize};

use crate::credential::CredentialPayload;
use crate::error::Result;

pub use encoded::EncodedCodec;
pub use sealed::{vault_key_message, SealedCodec};

/// Converts payloads to and from their ledger text form
pub trait PayloadCodec: Send + Sync {
    /// Pack a payload into ledger text
    fn encode(&self, payload: &CredentialPayload) -> Result<String>;

    /// Unpack ledger text; `id` is only used for error reporting
    fn decode(&self, id: &str, encoded: &str) -> Result<CredentialPayload>;

    /// Short name for logging
    fn name(&self) -> &'static str;
}

/// Which codec the vault uses for new and existing payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadEncoding {
    /// Reversible base64 JSON
    #[default]
    Encoded,
    /// AES-256-GCM under a key derived from the wallet signature
    Sealed,
}

impl std::fmt::Display for PayloadEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encoded => f.write_str("encoded"),
            Self::Sealed => f.write_str("sealed"),
        }
    }
}

/// Parse payload JSON bytes, requiring a structurally valid record
fn parse_payload(id: &str, json: &[u8]) -> Result<CredentialPayload> {
    serde_json::from_slice(json)
        .map_err(|e| crate::error::KeyforgeError::decode_failed(id, format!("invalid payload: {}", e)))
}
