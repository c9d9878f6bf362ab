//! Dual-layer envelope encryption
//!
//! A payload is sealed twice: first under a key derived from the user's
//! password, then under a key derived from the process-wide [`SystemSecret`].
//! Both keys come from the same per-record salt, so the salt is the only
//! extra value that has to travel with the ciphertext.
//!
//! Decryption peels the system layer first. A tag failure there means the
//! blob was produced by another instance (or tampered with) and is reported as
//! [`CryptarisError::IntegrityFailure`]; a tag failure on the inner layer is a
//! wrong password, [`CryptarisError::AuthenticationFailure`].
//!
//! ## File container
//!
//! ```text
//! salt(16) || nonce2(12) || AES-GCM(system_key, nonce1(12) || AES-GCM(user_key, plaintext))
//! ```

use aes_gcm::aead::{rand_core::RngCore, OsRng};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::{CryptarisError, CryptarisResult};

use super::encryption::{self, NONCE_SIZE};
use super::key_derivation::{derive_key, generate_salt, SALT_SIZE};
use super::SecureString;

/// Smallest file container that can hold a salt and a nonce
pub const MIN_CONTAINER_SIZE: usize = SALT_SIZE + NONCE_SIZE;

/// Length of a randomly generated system secret before base64 encoding
const GENERATED_SECRET_BYTES: usize = 32;

/// The process-wide secret bound into every envelope's outer layer
///
/// Built once at startup and handed to [`EnvelopeCipher`]. When no secret is
/// configured a random one is generated; envelopes sealed under it cannot be
/// opened after the process exits.
#[derive(Clone)]
pub struct SystemSecret {
    secret: SecureString,
    ephemeral: bool,
}

impl SystemSecret {
    /// Use a configured secret
    pub fn new(secret: impl Into<SecureString>) -> Self {
        Self {
            secret: secret.into(),
            ephemeral: false,
        }
    }

    /// Generate a random, process-lifetime secret
    pub fn generate() -> Self {
        let mut bytes = Zeroizing::new([0u8; GENERATED_SECRET_BYTES]);
        OsRng.fill_bytes(&mut *bytes);
        Self {
            secret: SecureString::new(STANDARD.encode(&*bytes)),
            ephemeral: true,
        }
    }

    /// Use the configured secret if present and non-empty, else generate one
    pub fn from_config(configured: Option<&str>) -> Self {
        match configured {
            Some(secret) if !secret.is_empty() => Self::new(secret),
            _ => {
                tracing::warn!(
                    "SYSTEM_MASTER_KEY is not set; using a randomly generated volatile key. \
                     Data encrypted by this process will NOT be decryptable after it exits."
                );
                Self::generate()
            }
        }
    }

    /// Whether this secret was generated at random rather than configured
    pub fn is_ephemeral(&self) -> bool {
        self.ephemeral
    }

    fn as_str(&self) -> &str {
        self.secret.as_str()
    }
}

impl std::fmt::Debug for SystemSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemSecret")
            .field("ephemeral", &self.ephemeral)
            .finish_non_exhaustive()
    }
}

/// Mode tag carried in transient results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnvelopeMode {
    /// Dual-layer, bound to the system secret
    #[default]
    SystemBound,
}

/// Transient encryption result handed back to callers
///
/// Nonces are embedded in `ciphertext`; the salt is the only extra value
/// needed for decryption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeRecord {
    /// Outer-layer blob (base64)
    pub ciphertext: String,
    /// Key derivation salt (base64)
    pub salt: String,
    /// Encryption scheme
    #[serde(default)]
    pub mode: EnvelopeMode,
}

impl EnvelopeRecord {
    fn new(salt: &[u8], ciphertext: &[u8]) -> Self {
        Self {
            ciphertext: STANDARD.encode(ciphertext),
            salt: STANDARD.encode(salt),
            mode: EnvelopeMode::SystemBound,
        }
    }

    /// Decode the salt from base64
    pub fn decode_salt(&self) -> CryptarisResult<Vec<u8>> {
        STANDARD
            .decode(&self.salt)
            .map_err(|e| CryptarisError::Validation(format!("Invalid salt encoding: {}", e)))
    }

    /// Decode the ciphertext from base64
    pub fn decode_ciphertext(&self) -> CryptarisResult<Vec<u8>> {
        STANDARD
            .decode(&self.ciphertext)
            .map_err(|e| CryptarisError::Validation(format!("Invalid ciphertext encoding: {}", e)))
    }

    /// Pack into the on-disk file container: `salt || ciphertext`
    pub fn to_container(&self) -> CryptarisResult<Vec<u8>> {
        let salt = self.decode_salt()?;
        let ciphertext = self.decode_ciphertext()?;
        let mut container = Vec::with_capacity(salt.len() + ciphertext.len());
        container.extend_from_slice(&salt);
        container.extend_from_slice(&ciphertext);
        Ok(container)
    }

    /// Unpack an on-disk file container
    ///
    /// # Errors
    ///
    /// Inputs shorter than [`MIN_CONTAINER_SIZE`] are rejected as malformed.
    pub fn from_container(container: &[u8]) -> CryptarisResult<Self> {
        if container.len() < MIN_CONTAINER_SIZE {
            return Err(CryptarisError::Validation(format!(
                "Invalid file format: container must be at least {} bytes, got {}",
                MIN_CONTAINER_SIZE,
                container.len()
            )));
        }
        let (salt, ciphertext) = container.split_at(SALT_SIZE);
        Ok(Self::new(salt, ciphertext))
    }
}

/// Dual-layer authenticated encryption bound to a [`SystemSecret`]
#[derive(Debug, Clone)]
pub struct EnvelopeCipher {
    system_secret: SystemSecret,
}

impl EnvelopeCipher {
    /// Create a cipher bound to the given system secret
    pub fn new(system_secret: SystemSecret) -> Self {
        Self { system_secret }
    }

    /// The bound system secret
    pub fn system_secret(&self) -> &SystemSecret {
        &self.system_secret
    }

    /// Encrypt raw bytes, returning `(salt, outer_blob)`
    pub fn encrypt_bytes(
        &self,
        plaintext: &[u8],
        password: &str,
    ) -> CryptarisResult<([u8; SALT_SIZE], Vec<u8>)> {
        let salt = generate_salt();

        let user_key = derive_key(password, &salt)?;
        let inner = Zeroizing::new(encryption::seal(&user_key, plaintext)?);

        // Both layers derive from the one per-record salt.
        let system_key = derive_key(self.system_secret.as_str(), &salt)?;
        let outer = encryption::seal(&system_key, &inner)?;

        Ok((salt, outer))
    }

    /// Decrypt raw bytes produced by [`EnvelopeCipher::encrypt_bytes`]
    pub fn decrypt_bytes(
        &self,
        ciphertext: &[u8],
        password: &str,
        salt: &[u8],
    ) -> CryptarisResult<Vec<u8>> {
        if salt.len() != SALT_SIZE {
            return Err(CryptarisError::Validation(format!(
                "Invalid salt size: expected {}, got {}",
                SALT_SIZE,
                salt.len()
            )));
        }
        if ciphertext.len() < NONCE_SIZE {
            return Err(CryptarisError::Validation(format!(
                "Ciphertext too short: expected at least {} bytes, got {}",
                NONCE_SIZE,
                ciphertext.len()
            )));
        }

        let system_key = derive_key(self.system_secret.as_str(), salt)?;
        let inner = Zeroizing::new(
            encryption::open(&system_key, ciphertext)
                .map_err(|_| CryptarisError::IntegrityFailure)?,
        );

        let user_key = derive_key(password, salt)?;
        encryption::open(&user_key, &inner).map_err(|_| CryptarisError::AuthenticationFailure)
    }

    /// Encrypt into a transient [`EnvelopeRecord`]
    pub fn encrypt(&self, plaintext: &[u8], password: &str) -> CryptarisResult<EnvelopeRecord> {
        let (salt, outer) = self.encrypt_bytes(plaintext, password)?;
        Ok(EnvelopeRecord::new(&salt, &outer))
    }

    /// Decrypt a transient [`EnvelopeRecord`]
    pub fn decrypt(&self, record: &EnvelopeRecord, password: &str) -> CryptarisResult<Vec<u8>> {
        let salt = record.decode_salt()?;
        let ciphertext = record.decode_ciphertext()?;
        self.decrypt_bytes(&ciphertext, password, &salt)
    }

    /// Encrypt into the self-describing file container
    pub fn encrypt_container(&self, plaintext: &[u8], password: &str) -> CryptarisResult<Vec<u8>> {
        let (salt, outer) = self.encrypt_bytes(plaintext, password)?;
        let mut container = Vec::with_capacity(SALT_SIZE + outer.len());
        container.extend_from_slice(&salt);
        container.extend_from_slice(&outer);
        Ok(container)
    }

    /// Decrypt a file container produced by [`EnvelopeCipher::encrypt_container`]
    pub fn decrypt_container(&self, container: &[u8], password: &str) -> CryptarisResult<Vec<u8>> {
        if container.len() < MIN_CONTAINER_SIZE {
            return Err(CryptarisError::Validation(format!(
                "Invalid file format: container must be at least {} bytes, got {}",
                MIN_CONTAINER_SIZE,
                container.len()
            )));
        }
        let (salt, ciphertext) = container.split_at(SALT_SIZE);
        self.decrypt_bytes(ciphertext, password, salt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cipher(secret: &str) -> EnvelopeCipher {
        EnvelopeCipher::new(SystemSecret::new(secret))
    }

    #[test]
    fn test_encrypt_decrypt() {
        let cipher = cipher("system-secret");
        let record = cipher.encrypt(b"attack at dawn", "hunter2").unwrap();

        assert_eq!(record.mode, EnvelopeMode::SystemBound);
        assert_eq!(cipher.decrypt(&record, "hunter2").unwrap(), b"attack at dawn");
    }

    #[test]
    fn test_wrong_password_is_authentication_failure() {
        let cipher = cipher("system-secret");
        let record = cipher.encrypt(b"attack at dawn", "hunter2").unwrap();

        let err = cipher.decrypt(&record, "hunter3").unwrap_err();
        assert!(matches!(err, CryptarisError::AuthenticationFailure));
    }

    #[test]
    fn test_foreign_system_secret_is_integrity_failure() {
        let record = cipher("instance-a").encrypt(b"payload", "pw").unwrap();

        let err = cipher("instance-b").decrypt(&record, "pw").unwrap_err();
        assert!(matches!(err, CryptarisError::IntegrityFailure));
    }

    #[test]
    fn test_tampered_ciphertext_is_integrity_failure() {
        let cipher = cipher("system-secret");
        let record = cipher.encrypt(b"payload", "pw").unwrap();

        let mut raw = record.decode_ciphertext().unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0x01;
        let tampered = EnvelopeRecord {
            ciphertext: STANDARD.encode(&raw),
            ..record
        };

        let err = cipher.decrypt(&tampered, "pw").unwrap_err();
        assert!(matches!(err, CryptarisError::IntegrityFailure));
    }

    #[test]
    fn test_repeat_encryptions_differ() {
        let cipher = cipher("system-secret");
        let a = cipher.encrypt(b"same", "pw").unwrap();
        let b = cipher.encrypt(b"same", "pw").unwrap();

        assert_ne!(a.salt, b.salt);
        assert_ne!(a.ciphertext, b.ciphertext);

        let raw_a = a.decode_ciphertext().unwrap();
        let raw_b = b.decode_ciphertext().unwrap();
        assert_ne!(raw_a[..NONCE_SIZE], raw_b[..NONCE_SIZE]);

        assert_eq!(cipher.decrypt(&a, "pw").unwrap(), b"same");
        assert_eq!(cipher.decrypt(&b, "pw").unwrap(), b"same");
    }

    #[test]
    fn test_container_layout() {
        let cipher = cipher("system-secret");
        let container = cipher.encrypt_container(b"file body", "pw").unwrap();

        // salt + nonce2 + (nonce1 + body + tag1) + tag2
        assert_eq!(container.len(), 16 + 12 + 12 + 9 + 16 + 16);
        assert_eq!(cipher.decrypt_container(&container, "pw").unwrap(), b"file body");

        let record = EnvelopeRecord::from_container(&container).unwrap();
        assert_eq!(record.to_container().unwrap(), container);
        assert_eq!(cipher.decrypt(&record, "pw").unwrap(), b"file body");
    }

    #[test]
    fn test_short_container_rejected() {
        let cipher = cipher("system-secret");
        let err = cipher.decrypt_container(&[0u8; 27], "pw").unwrap_err();
        assert!(err.is_validation());
        assert!(EnvelopeRecord::from_container(&[0u8; 10]).unwrap_err().is_validation());
    }

    #[test]
    fn test_bad_salt_rejected() {
        let cipher = cipher("system-secret");
        let record = cipher.encrypt(b"payload", "pw").unwrap();
        let bad = EnvelopeRecord {
            salt: STANDARD.encode([0u8; 8]),
            ..record.clone()
        };
        assert!(cipher.decrypt(&bad, "pw").unwrap_err().is_validation());

        let not_base64 = EnvelopeRecord {
            salt: "***".to_string(),
            ..record
        };
        assert!(cipher.decrypt(&not_base64, "pw").unwrap_err().is_validation());
    }

    #[test]
    fn test_record_json_shape() {
        let cipher = cipher("system-secret");
        let record = cipher.encrypt(b"payload", "pw").unwrap();
        let json: serde_json::Value = serde_json::to_value(&record).unwrap();

        assert_eq!(json["mode"], "SYSTEM_BOUND");
        assert!(json.get("nonce").is_none());
        assert!(json["salt"].is_string());
    }

    #[test]
    fn test_generated_secret_is_ephemeral() {
        let generated = SystemSecret::generate();
        assert!(generated.is_ephemeral());
        assert!(!SystemSecret::new("configured").is_ephemeral());
        assert!(SystemSecret::from_config(None).is_ephemeral());
        assert!(SystemSecret::from_config(Some("")).is_ephemeral());
        assert!(!SystemSecret::from_config(Some("set")).is_ephemeral());

        // Two generated secrets are independent instances.
        let record = EnvelopeCipher::new(generated).encrypt(b"x", "pw").unwrap();
        let err = EnvelopeCipher::new(SystemSecret::generate())
            .decrypt(&record, "pw")
            .unwrap_err();
        assert!(matches!(err, CryptarisError::IntegrityFailure));
    }

    #[test]
    fn test_debug_hides_secret() {
        let secret = SystemSecret::new("do-not-print");
        assert!(!format!("{:?}", secret).contains("do-not-print"));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(6))]

        #[test]
        fn prop_round_trip(
            plaintext in proptest::collection::vec(any::<u8>(), 0..512),
            password in "[ -~]{0,32}",
        ) {
            let cipher = cipher("prop-secret");
            let record = cipher.encrypt(&plaintext, &password).unwrap();
            prop_assert_eq!(cipher.decrypt(&record, &password).unwrap(), plaintext);
        }
    }
}
