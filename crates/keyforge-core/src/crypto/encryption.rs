//! AES-256-GCM authenticated encryption
//!
//! Wire format: `kf1:{iv_hex}:{auth_tag_hex}:{ciphertext_hex}`
//! - IV: 12 bytes, fresh per seal
//! - Auth tag: 16 bytes
//! - Ciphertext: same length as the plaintext

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::RngCore;

use super::MasterKey;
use crate::error::{KeyforgeError, Result};

const FORMAT_TAG: &str = "kf1";
const IV_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// Sealed bytes with their IV and auth tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedBox {
    pub iv: [u8; IV_LEN],
    pub auth_tag: [u8; TAG_LEN],
    pub ciphertext: Vec<u8>,
}

impl std::fmt::Display for SealedBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            FORMAT_TAG,
            hex::encode(self.iv),
            hex::encode(self.auth_tag),
            hex::encode(&self.ciphertext)
        )
    }
}

impl std::str::FromStr for SealedBox {
    type Err = KeyforgeError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        let [tag, iv_hex, auth_tag_hex, ciphertext_hex] = parts.as_slice() else {
            return Err(KeyforgeError::DecryptionError(
                "expected kf1:iv:tag:ciphertext".to_string(),
            ));
        };
        if *tag != FORMAT_TAG {
            return Err(KeyforgeError::DecryptionError(format!(
                "unknown sealed format '{}'",
                tag
            )));
        }

        let iv = decode_fixed::<IV_LEN>(iv_hex, "IV")?;
        let auth_tag = decode_fixed::<TAG_LEN>(auth_tag_hex, "auth tag")?;
        let ciphertext = hex::decode(ciphertext_hex)
            .map_err(|e| KeyforgeError::DecryptionError(format!("Invalid ciphertext hex: {}", e)))?;

        Ok(Self {
            iv,
            auth_tag,
            ciphertext,
        })
    }
}

fn decode_fixed<const N: usize>(hex_str: &str, what: &str) -> Result<[u8; N]> {
    let bytes = hex::decode(hex_str)
        .map_err(|e| KeyforgeError::DecryptionError(format!("Invalid {} hex: {}", what, e)))?;
    bytes.as_slice().try_into().map_err(|_| {
        KeyforgeError::DecryptionError(format!(
            "Invalid {} length: expected {}, got {}",
            what,
            N,
            bytes.len()
        ))
    })
}

/// Encrypt plaintext with a fresh random IV
pub fn seal(plaintext: &[u8], key: &MasterKey) -> Result<SealedBox> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| KeyforgeError::EncryptionError(e.to_string()))?;

    let mut iv = [0u8; IV_LEN];
    rand::thread_rng().fill_bytes(&mut iv);

    // aes-gcm appends the tag to the ciphertext
    let mut sealed = cipher
        .encrypt(Nonce::from_slice(&iv), plaintext)
        .map_err(|e| KeyforgeError::EncryptionError(e.to_string()))?;

    if sealed.len() < TAG_LEN {
        return Err(KeyforgeError::EncryptionError(
            "Ciphertext too short".to_string(),
        ));
    }

    let tag_bytes = sealed.split_off(sealed.len() - TAG_LEN);
    let mut auth_tag = [0u8; TAG_LEN];
    auth_tag.copy_from_slice(&tag_bytes);

    Ok(SealedBox {
        iv,
        auth_tag,
        ciphertext: sealed,
    })
}

/// Decrypt and authenticate a sealed box
pub fn open(sealed: &SealedBox, key: &MasterKey) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| KeyforgeError::DecryptionError(e.to_string()))?;

    let mut joined = Vec::with_capacity(sealed.ciphertext.len() + TAG_LEN);
    joined.extend_from_slice(&sealed.ciphertext);
    joined.extend_from_slice(&sealed.auth_tag);

    cipher
        .decrypt(Nonce::from_slice(&sealed.iv), joined.as_slice())
        .map_err(|e| KeyforgeError::DecryptionError(e.to_string()))
}
