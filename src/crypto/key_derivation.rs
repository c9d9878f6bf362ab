//! Key derivation using PBKDF2-HMAC-SHA256
//!
//! Turns a secret string and a 16-byte salt into a 256-bit key. The work
//! factor is a crate-wide constant so every record costs the same to derive.

use aes_gcm::aead::{rand_core::RngCore, OsRng};
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{CryptarisError, CryptarisResult};

/// Size of a key derivation salt in bytes
pub const SALT_SIZE: usize = 16;

/// Size of a derived key in bytes (AES-256)
pub const KEY_SIZE: usize = 32;

/// PBKDF2 iteration count
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// A 256-bit symmetric key, zeroed when dropped
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_SIZE],
}

impl DerivedKey {
    /// Wrap raw key bytes
    pub fn from_bytes(key: [u8; KEY_SIZE]) -> Self {
        Self { key }
    }

    /// Get the key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// Generate a fresh random salt
pub fn generate_salt() -> [u8; SALT_SIZE] {
    let mut salt = [0u8; SALT_SIZE];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Derive a key from a secret and salt
///
/// Deterministic: the same secret and salt always produce the same key.
///
/// # Errors
///
/// Returns [`CryptarisError::Validation`] if the salt is not exactly
/// [`SALT_SIZE`] bytes.
pub fn derive_key(secret: &str, salt: &[u8]) -> CryptarisResult<DerivedKey> {
    if salt.len() != SALT_SIZE {
        return Err(CryptarisError::Validation(format!(
            "Invalid salt size: expected {}, got {}",
            SALT_SIZE,
            salt.len()
        )));
    }

    let mut key = [0u8; KEY_SIZE];
    pbkdf2_hmac::<Sha256>(secret.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key);

    let derived = DerivedKey::from_bytes(key);
    key.zeroize();
    Ok(derived)
}
