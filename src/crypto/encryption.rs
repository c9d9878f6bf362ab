//! AES-256-GCM encryption/decryption
//!
//! A single authenticated layer. `seal` produces `nonce(12) || ciphertext+tag`
//! with a fresh random nonce per call; the explicit-nonce variants exist for
//! stores that keep the nonce in a separate field.

use aes_gcm::{
    aead::{rand_core::RngCore, Aead, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce,
};

use crate::error::{CryptarisError, CryptarisResult};

use super::DerivedKey;

/// Size of the AES-GCM nonce in bytes (96 bits)
pub const NONCE_SIZE: usize = 12;

/// Size of the AES-GCM authentication tag in bytes
pub const TAG_SIZE: usize = 16;

/// Authentication failure while opening a layer
///
/// Carries no detail. Callers map it onto the failure kind that
/// fits the layer they were opening.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenError;

/// Generate a fresh random nonce
pub fn generate_nonce() -> [u8; NONCE_SIZE] {
    let mut nonce = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);
    nonce
}

fn cipher_for(key: &DerivedKey) -> Aes256Gcm {
    Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()))
}

/// Encrypt with a caller-supplied nonce
///
/// The caller is responsible for never reusing `nonce` under the same key.
pub fn encrypt_with_nonce(
    key: &DerivedKey,
    nonce: &[u8; NONCE_SIZE],
    plaintext: &[u8],
) -> CryptarisResult<Vec<u8>> {
    cipher_for(key)
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|e| CryptarisError::Encryption(format!("Encryption failed: {}", e)))
}

/// Decrypt ciphertext produced by [`encrypt_with_nonce`]
pub fn decrypt_with_nonce(
    key: &DerivedKey,
    nonce: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>, OpenError> {
    if nonce.len() != NONCE_SIZE {
        return Err(OpenError);
    }
    cipher_for(key)
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| OpenError)
}

/// Encrypt under a fresh nonce, returning `nonce || ciphertext`
pub fn seal(key: &DerivedKey, plaintext: &[u8]) -> CryptarisResult<Vec<u8>> {
    let nonce = generate_nonce();
    let ciphertext = encrypt_with_nonce(key, &nonce, plaintext)?;

    let mut sealed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    sealed.extend_from_slice(&nonce);
    sealed.extend_from_slice(&ciphertext);
    Ok(sealed)
}

/// Open a `nonce || ciphertext` blob produced by [`seal`]
pub fn open(key: &DerivedKey, sealed: &[u8]) -> Result<Vec<u8>, OpenError> {
    if sealed.len() < NONCE_SIZE + TAG_SIZE {
        return Err(OpenError);
    }
    let (nonce, ciphertext) = sealed.split_at(NONCE_SIZE);
    decrypt_with_nonce(key, nonce, ciphertext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::key_derivation::KEY_SIZE;

    fn test_key(byte: u8) -> DerivedKey {
        DerivedKey::from_bytes([byte; KEY_SIZE])
    }

    #[test]
    fn test_seal_open() {
        let key = test_key(1);
        let plaintext = b"Hello, World!";

        let sealed = seal(&key, plaintext).unwrap();
        assert_eq!(sealed.len(), NONCE_SIZE + plaintext.len() + TAG_SIZE);

        let opened = open(&key, &sealed).unwrap();
        assert_eq!(plaintext, opened.as_slice());
    }

    #[test]
    fn test_different_nonces() {
        let key = test_key(1);
        let sealed1 = seal(&key, b"same").unwrap();
        let sealed2 = seal(&key, b"same").unwrap();

        assert_ne!(sealed1[..NONCE_SIZE], sealed2[..NONCE_SIZE]);
        assert_ne!(sealed1, sealed2);
    }

    #[test]
    fn test_wrong_key_fails() {
        let sealed = seal(&test_key(1), b"Hello, World!").unwrap();
        assert_eq!(open(&test_key(2), &sealed), Err(OpenError));
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let key = test_key(1);
        let mut sealed = seal(&key, b"Hello, World!").unwrap();
        sealed[NONCE_SIZE] ^= 0xFF;
        assert_eq!(open(&key, &sealed), Err(OpenError));
    }

    #[test]
    fn test_truncated_blob_fails() {
        let key = test_key(1);
        assert_eq!(open(&key, &[0u8; NONCE_SIZE + TAG_SIZE - 1]), Err(OpenError));
    }

    #[test]
    fn test_explicit_nonce() {
        let key = test_key(3);
        let nonce = generate_nonce();
        let ciphertext = encrypt_with_nonce(&key, &nonce, b"payload").unwrap();

        assert_eq!(
            decrypt_with_nonce(&key, &nonce, &ciphertext).unwrap(),
            b"payload"
        );
        assert_eq!(
            decrypt_with_nonce(&key, &nonce[..8], &ciphertext),
            Err(OpenError)
        );
    }

    #[test]
    fn test_empty_plaintext() {
        let key = test_key(1);
        let sealed = seal(&key, b"").unwrap();
        assert!(open(&key, &sealed).unwrap().is_empty());
    }

    #[test]
    fn test_large_plaintext() {
        let key = test_key(1);
        let plaintext: Vec<u8> = (0..10000).map(|i| (i % 256) as u8).collect();

        let sealed = seal(&key, &plaintext).unwrap();
        assert_eq!(open(&key, &sealed).unwrap(), plaintext);
    }
}
