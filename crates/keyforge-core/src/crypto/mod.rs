//! Cryptographic primitives backing sealed payloads
//!
//! - AES-256-GCM authenticated encryption
//! - Argon2id key derivation from a wallet signature
//! - Zeroize-on-drop holders for keys and secrets

mod encryption;
mod key_derivation;
mod secure_memory;

pub use encryption::{open, seal, SealedBox};
pub use key_derivation::{derive_key, KeyDerivationParams};
pub use secure_memory::{MasterKey, SecretString};
