//! AES-256-GCM sealed payloads keyed by a wallet signature

use super::{parse_payload, PayloadCodec};
use crate::credential::CredentialPayload;
use crate::crypto::{derive_key, open, seal, KeyDerivationParams, MasterKey, SealedBox};
use crate::error::{KeyforgeError, Result};

/// The message a wallet signs to unlock sealed payloads for `account`
pub fn vault_key_message(account: &str) -> String {
    format!("KeyForge vault key v1:{}", account.to_lowercase())
}

const SALT_PREFIX: &str = "keyforge-vault-salt:";

/// Codec that encrypts payload JSON
pub struct SealedCodec {
    key: MasterKey,
}

impl SealedCodec {
    pub fn new(key: MasterKey) -> Self {
        Self { key }
    }

    /// Derive the vault key from the account's signature over [`vault_key_message`]
    pub fn from_signature(
        account: &str,
        signature: &str,
        params: Option<KeyDerivationParams>,
    ) -> Result<Self> {
        let salt = format!("{}{}", SALT_PREFIX, account.to_lowercase());
        let key = derive_key(signature.as_bytes(), salt.as_bytes(), params)?;
        Ok(Self::new(key))
    }
}

impl std::fmt::Debug for SealedCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SealedCodec").field("key", &self.key).finish()
    }
}

impl PayloadCodec for SealedCodec {
    fn encode(&self, payload: &CredentialPayload) -> Result<String> {
        let json = serde_json::to_vec(payload)?;
        Ok(seal(&json, &self.key)?.to_string())
    }

    fn decode(&self, id: &str, encoded: &str) -> Result<CredentialPayload> {
        let sealed: SealedBox = encoded
            .trim()
            .parse()
            .map_err(|e: KeyforgeError| KeyforgeError::decode_failed(id, e.to_string()))?;
        let json = open(&sealed, &self.key)
            .map_err(|e| KeyforgeError::decode_failed(id, e.to_string()))?;
        parse_payload(id, &json)
    }

    fn name(&self) -> &'static str {
        "sealed"
    }
}
