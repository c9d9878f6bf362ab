//! Vault key material
//!
//! The vault encrypts every stored payload under one process-wide key,
//! derived once as SHA-256 of a configured secret string.

use sha2::{Digest, Sha256};

use crate::crypto::{DerivedKey, KEY_SIZE};

/// Secret used when no vault secret is configured
///
/// Every deployment running on this default shares the same vault key.
pub const DEFAULT_VAULT_SECRET: &str = "CRYPTARIS_PERSISTENT_MASTER_KEY_V1";

/// Symmetric key owned by a [`super::SecureLinkVault`] for its lifetime
#[derive(Clone)]
pub struct VaultKey {
    key: DerivedKey,
    is_default: bool,
}

impl VaultKey {
    /// Derive the vault key from a secret string
    pub fn from_secret(secret: &str) -> Self {
        let digest = Sha256::digest(secret.as_bytes());
        let mut bytes = [0u8; KEY_SIZE];
        bytes.copy_from_slice(&digest);
        Self {
            key: DerivedKey::from_bytes(bytes),
            is_default: secret == DEFAULT_VAULT_SECRET,
        }
    }

    /// Use the configured secret if present and non-empty, else the default
    pub fn from_config(configured: Option<&str>) -> Self {
        match configured {
            Some(secret) if !secret.is_empty() => Self::from_secret(secret),
            _ => {
                tracing::warn!(
                    "CRYPTARIS_VAULT_SECRET is not set; using the built-in default vault secret. \
                     Any deployment using the default shares this key."
                );
                Self::from_secret(DEFAULT_VAULT_SECRET)
            }
        }
    }

    /// Whether the key came from [`DEFAULT_VAULT_SECRET`]
    pub fn is_default(&self) -> bool {
        self.is_default
    }

    pub(crate) fn derived(&self) -> &DerivedKey {
        &self.key
    }
}

impl std::fmt::Debug for VaultKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultKey")
            .field("is_default", &self.is_default)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_deterministic() {
        let a = VaultKey::from_secret("vault-secret");
        let b = VaultKey::from_secret("vault-secret");
        assert_eq!(a.derived().as_bytes(), b.derived().as_bytes());
        assert!(!a.is_default());
    }

    #[test]
    fn test_key_matches_sha256() {
        let key = VaultKey::from_secret("abc");
        assert_eq!(
            hex::encode(key.derived().as_bytes()),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_default_fallback() {
        let key = VaultKey::from_config(None);
        assert!(key.is_default());
        assert_eq!(
            key.derived().as_bytes(),
            VaultKey::from_secret(DEFAULT_VAULT_SECRET).derived().as_bytes()
        );
        assert!(VaultKey::from_config(Some("")).is_default());
        assert!(!VaultKey::from_config(Some("configured")).is_default());
    }
}
