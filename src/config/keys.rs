//! Secrets supplied through the environment
//!
//! The configured values are captured once at startup. Each key is built only
//! when a command needs it, so fallback warnings name the key actually in use.

use crate::crypto::{SecureString, SystemSecret};
use crate::vault::VaultKey;

/// Environment variable holding the envelope system secret
pub const SYSTEM_SECRET_ENV: &str = "SYSTEM_MASTER_KEY";

/// Environment variable seeding the vault key
pub const VAULT_SECRET_ENV: &str = "CRYPTARIS_VAULT_SECRET";

/// Process-wide secret configuration
#[derive(Clone, Default)]
pub struct KeyMaterial {
    system_secret: Option<SecureString>,
    vault_secret: Option<SecureString>,
}

impl KeyMaterial {
    /// Capture the configured secrets; empty values count as unset
    pub fn new(system_secret: Option<&str>, vault_secret: Option<&str>) -> Self {
        let configured = |s: Option<&str>| s.filter(|s| !s.is_empty()).map(SecureString::from);
        Self {
            system_secret: configured(system_secret),
            vault_secret: configured(vault_secret),
        }
    }

    /// Whether a system secret was configured
    pub fn has_system_secret(&self) -> bool {
        self.system_secret.is_some()
    }

    /// Whether a vault secret was configured
    pub fn has_vault_secret(&self) -> bool {
        self.vault_secret.is_some()
    }

    /// The envelope system secret, generating a volatile one if unset
    pub fn system_secret(&self) -> SystemSecret {
        SystemSecret::from_config(self.system_secret.as_deref())
    }

    /// The vault key, falling back to the built-in default secret if unset
    pub fn vault_key(&self) -> VaultKey {
        VaultKey::from_config(self.vault_secret.as_deref())
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("has_system_secret", &self.has_system_secret())
            .field("has_vault_secret", &self.has_vault_secret())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_secrets() {
        let keys = KeyMaterial::new(Some("system"), Some("vault"));
        assert!(keys.has_system_secret());
        assert!(!keys.system_secret().is_ephemeral());
        assert!(!keys.vault_key().is_default());
    }

    #[test]
    fn test_fallbacks() {
        let keys = KeyMaterial::new(None, Some(""));
        assert!(!keys.has_system_secret());
        assert!(!keys.has_vault_secret());
        assert!(keys.system_secret().is_ephemeral());
        assert!(keys.vault_key().is_default());
    }

    #[test]
    fn test_debug_hides_secrets() {
        let keys = KeyMaterial::new(Some("sys-value"), Some("vault-value"));
        let debug = format!("{:?}", keys);
        assert!(!debug.contains("sys-value"));
        assert!(!debug.contains("vault-value"));
    }
}
