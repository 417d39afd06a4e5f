//! Argon2id key derivation

use argon2::{Algorithm, Argon2, Params, Version};

use super::MasterKey;
use crate::error::{KeyforgeError, Result};

/// Parameters for Argon2id key derivation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyDerivationParams {
    /// Memory cost in KiB (default: 65536 = 64MB)
    pub memory_cost: u32,
    /// Time cost / iterations (default: 3)
    pub time_cost: u32,
    /// Parallelism (default: 4)
    pub parallelism: u32,
}

impl Default for KeyDerivationParams {
    fn default() -> Self {
        Self {
            memory_cost: 65536,
            time_cost: 3,
            parallelism: 4,
        }
    }
}

impl KeyDerivationParams {
    /// Cheap parameters for tests and local development signatures
    pub fn interactive() -> Self {
        Self {
            memory_cost: 8192,
            time_cost: 1,
            parallelism: 1,
        }
    }
}

/// Derive a 256-bit key from secret material and a salt
///
/// The salt must be at least 8 bytes.
pub fn derive_key(
    secret: &[u8],
    salt: &[u8],
    params: Option<KeyDerivationParams>,
) -> Result<MasterKey> {
    let params = params.unwrap_or_default();

    let argon2_params = Params::new(
        params.memory_cost,
        params.time_cost,
        params.parallelism,
        Some(32),
    )
    .map_err(|e| KeyforgeError::KeyDerivationError(e.to_string()))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);

    let mut key_bytes = [0u8; 32];
    argon2
        .hash_password_into(secret, salt, &mut key_bytes)
        .map_err(|e| KeyforgeError::KeyDerivationError(e.to_string()))?;

    Ok(MasterKey::new(key_bytes))
}
