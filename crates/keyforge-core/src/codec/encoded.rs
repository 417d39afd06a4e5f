//! Reversible base64 JSON encoding
//!
//! Compatible with payloads written by the web client: standard padded base64
//! over the camelCase JSON object. This is an encoding, not encryption.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::{parse_payload, PayloadCodec};
use crate::credential::CredentialPayload;
use crate::error::{KeyforgeError, Result};

#[derive(Debug, Clone, Copy, Default)]
pub struct EncodedCodec;

impl EncodedCodec {
    pub fn new() -> Self {
        Self
    }
}

impl PayloadCodec for EncodedCodec {
    fn encode(&self, payload: &CredentialPayload) -> Result<String> {
        let json = serde_json::to_vec(payload)?;
        Ok(STANDARD.encode(json))
    }

    fn decode(&self, id: &str, encoded: &str) -> Result<CredentialPayload> {
        let json = STANDARD
            .decode(encoded.trim())
            .map_err(|e| KeyforgeError::decode_failed(id, format!("invalid base64: {}", e)))?;
        parse_payload(id, &json)
    }

    fn name(&self) -> &'static str {
        "encoded"
    }
}
