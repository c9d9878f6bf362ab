//! Secure link vault
//!
//! Stores a URL and/or a file behind a short random id, encrypted at rest
//! under the [`VaultKey`], optionally gated by a password and expiring after a
//! time-to-live. Access does not consume the link; it stays readable until it
//! expires and is swept.
//!
//! ```text
//! created ──► valid ──► expired ──► deleted (cleanup sweep)
//! ```

pub mod filename;
pub mod key;

pub use filename::sanitize_file_name;
pub use key::{VaultKey, DEFAULT_VAULT_SECRET};

use base64::{engine::general_purpose::STANDARD, Engine};
use sha2::{Digest, Sha256};

use crate::crypto::encryption::{decrypt_with_nonce, encrypt_with_nonce, generate_nonce};
use crate::crypto::SecureString;
use crate::error::{CryptarisError, CryptarisResult};
use crate::models::{epoch_seconds_now, LinkId, LinkRecord};
use crate::storage::LinkRepository;

/// Separator between nonce and ciphertext in the packed file column
const FILE_FIELD_SEPARATOR: char = ':';

/// Attempts at drawing a fresh id before giving up on primary-key collisions
const MAX_ID_ATTEMPTS: usize = 5;

/// Default share reference prefix
pub const DEFAULT_SHARE_BASE_URL: &str = "https://cryptaris.io/s/";

/// A file attached to a link
#[derive(Clone, PartialEq, Eq)]
pub struct LinkFile {
    /// File name (sanitized when stored)
    pub name: String,
    /// File contents
    pub bytes: Vec<u8>,
}

impl LinkFile {
    /// Create a new file attachment
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

impl std::fmt::Debug for LinkFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkFile")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Parameters for [`SecureLinkVault::create_link`]
#[derive(Debug, Clone, Default)]
pub struct CreateLinkRequest {
    /// URL to share
    pub url: Option<String>,
    /// File to share
    pub file: Option<LinkFile>,
    /// Access password; `None` leaves the link open to anyone holding the id
    pub password: Option<SecureString>,
    /// Lifetime in seconds; `0` never expires
    pub ttl_seconds: u64,
}

impl CreateLinkRequest {
    /// A request sharing only a URL
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    /// A request sharing only a file
    pub fn file(file: LinkFile) -> Self {
        Self {
            file: Some(file),
            ..Default::default()
        }
    }

    /// Gate the link behind a password
    pub fn with_password(mut self, password: impl Into<SecureString>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set the time-to-live in seconds
    pub fn with_ttl(mut self, ttl_seconds: u64) -> Self {
        self.ttl_seconds = ttl_seconds;
        self
    }

    fn has_url(&self) -> bool {
        self.url.as_deref().map(|u| !u.is_empty()).unwrap_or(false)
    }

    fn has_file(&self) -> bool {
        self.file.as_ref().map(|f| !f.bytes.is_empty()).unwrap_or(false)
    }
}

/// Result of creating a link
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SharedLink {
    /// Link id
    pub id: LinkId,
    /// Display reference built from the id
    pub share_reference: String,
    /// Expiry as epoch seconds; `0` never expires
    pub expiry: f64,
}

/// Decrypted contents of a link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessedLink {
    /// The shared URL, if one was stored
    pub url: Option<String>,
    /// The shared file, if one was stored
    pub file: Option<LinkFile>,
}

/// Store of password-gated, expiring secure links
pub struct SecureLinkVault<R: LinkRepository> {
    repository: R,
    key: VaultKey,
    share_base_url: String,
}

impl<R: LinkRepository> SecureLinkVault<R> {
    /// Create a vault over `repository` using `key` for payload encryption
    pub fn new(repository: R, key: VaultKey) -> Self {
        Self {
            repository,
            key,
            share_base_url: DEFAULT_SHARE_BASE_URL.to_string(),
        }
    }

    /// Override the prefix used to build share references
    pub fn with_share_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.share_base_url = base_url.into();
        self
    }

    /// The underlying repository
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Build the display reference for an id
    pub fn share_reference(&self, id: &LinkId) -> String {
        format!("{}{}", self.share_base_url, id)
    }

    /// Encrypt and durably store a new link
    ///
    /// # Errors
    ///
    /// [`CryptarisError::Validation`] if neither a URL nor a non-empty file
    /// is supplied; storage errors are propagated.
    pub fn create_link(&self, request: CreateLinkRequest) -> CryptarisResult<SharedLink> {
        if !request.has_url() && !request.has_file() {
            return Err(CryptarisError::Validation(
                "A URL or a file is required".to_string(),
            ));
        }

        let key = self.key.derived();
        let password_hash = request
            .password
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(hash_password);

        let url_nonce = generate_nonce();
        let url_plaintext = request.url.as_deref().unwrap_or_default();
        let encrypted_url = encrypt_with_nonce(key, &url_nonce, url_plaintext.as_bytes())?;

        let (encrypted_file, file_name) = match request.file.as_ref().filter(|f| !f.bytes.is_empty()) {
            Some(file) => {
                let mut file_nonce = generate_nonce();
                while file_nonce == url_nonce {
                    file_nonce = generate_nonce();
                }
                let ciphertext = encrypt_with_nonce(key, &file_nonce, &file.bytes)?;
                (
                    Some(pack_file_field(&file_nonce, &ciphertext)),
                    Some(sanitize_file_name(&file.name)),
                )
            }
            None => (None, None),
        };

        let created_at = epoch_seconds_now();
        let expiry = if request.ttl_seconds > 0 {
            created_at + request.ttl_seconds as f64
        } else {
            0.0
        };

        let mut record = LinkRecord {
            id: LinkId::new(),
            encrypted_url: STANDARD.encode(&encrypted_url),
            url_nonce: STANDARD.encode(url_nonce),
            password_hash,
            expiry,
            created_at,
            encrypted_file,
            file_name,
        };

        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.repository.insert(&record) {
                Ok(()) => break,
                Err(e) if e.is_duplicate() && attempts < MAX_ID_ATTEMPTS => {
                    tracing::debug!(link_id = %record.id, "Link id collision, regenerating");
                    record.id = LinkId::new();
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!(
            link_id = %record.id,
            has_file = record.encrypted_file.is_some(),
            password_protected = record.is_password_protected(),
            ttl_seconds = request.ttl_seconds,
            "Created secure link"
        );

        Ok(SharedLink {
            share_reference: self.share_reference(&record.id),
            id: record.id,
            expiry,
        })
    }

    /// Check the gates on a link and return its decrypted contents
    ///
    /// The link is not consumed; it stays accessible until it expires.
    ///
    /// # Errors
    ///
    /// In order of checking: `NotFound` (also for malformed ids), `Expired`
    /// (after sweeping expired links), `PasswordRequired` (also for an empty
    /// password), `IncorrectPassword`, then `CorruptData` if a payload fails
    /// to decrypt.
    pub fn access_link(&self, id: &str, password: Option<&str>) -> CryptarisResult<AccessedLink> {
        // Malformed ids never reach storage.
        let link_id = LinkId::parse(id).map_err(|_| CryptarisError::link_not_found(id))?;

        let record = self
            .repository
            .get_by_id(&link_id)?
            .ok_or_else(|| CryptarisError::link_not_found(id))?;

        if record.is_expired_at(epoch_seconds_now()) {
            tracing::warn!(link_id = %link_id, "Access attempted on expired link");
            if let Err(e) = self.cleanup() {
                tracing::warn!(error = %e, "Expired link sweep failed");
            }
            return Err(CryptarisError::Expired(link_id.to_string()));
        }

        if let Some(expected) = record.password_hash.as_deref() {
            let supplied = password
                .filter(|p| !p.is_empty())
                .ok_or(CryptarisError::PasswordRequired)?;
            // Direct comparison, not constant-time.
            if hash_password(supplied) != expected {
                return Err(CryptarisError::IncorrectPassword);
            }
        }

        let key = self.key.derived();

        let url_nonce = decode_field(&record.url_nonce, "URL nonce")?;
        let url_ciphertext = decode_field(&record.encrypted_url, "URL")?;
        let url_bytes = decrypt_with_nonce(key, &url_nonce, &url_ciphertext)
            .map_err(|_| CryptarisError::CorruptData("URL failed to decrypt".to_string()))?;
        let url = String::from_utf8(url_bytes)
            .map_err(|_| CryptarisError::CorruptData("URL is not valid UTF-8".to_string()))?;

        let file = match record.encrypted_file.as_deref() {
            Some(packed) => {
                let (nonce, ciphertext) = unpack_file_field(packed)?;
                let bytes = decrypt_with_nonce(key, &nonce, &ciphertext).map_err(|_| {
                    CryptarisError::CorruptData("File failed to decrypt".to_string())
                })?;
                let name = record
                    .file_name
                    .clone()
                    .unwrap_or_else(|| filename::FALLBACK_FILE_NAME.to_string());
                Some(LinkFile { name, bytes })
            }
            None => None,
        };

        tracing::debug!(link_id = %link_id, "Secure link accessed");

        Ok(AccessedLink {
            url: (!url.is_empty()).then_some(url),
            file,
        })
    }

    /// Delete all links whose expiry has passed
    ///
    /// Idempotent; returns the number of links removed by this call.
    pub fn cleanup(&self) -> CryptarisResult<usize> {
        let removed = self.repository.delete_expired(epoch_seconds_now())?;
        tracing::debug!(removed, "Expired link sweep complete");
        Ok(removed)
    }
}

/// Hex SHA-256 of a link password; an access gate, never key material
fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

fn pack_file_field(nonce: &[u8], ciphertext: &[u8]) -> String {
    format!(
        "{}{}{}",
        STANDARD.encode(nonce),
        FILE_FIELD_SEPARATOR,
        STANDARD.encode(ciphertext)
    )
}

fn unpack_file_field(packed: &str) -> CryptarisResult<(Vec<u8>, Vec<u8>)> {
    let (nonce, ciphertext) = packed
        .split_once(FILE_FIELD_SEPARATOR)
        .ok_or_else(|| CryptarisError::CorruptData("Malformed file payload".to_string()))?;
    Ok((
        decode_field(nonce, "file nonce")?,
        decode_field(ciphertext, "file")?,
    ))
}

fn decode_field(value: &str, what: &str) -> CryptarisResult<Vec<u8>> {
    STANDARD
        .decode(value)
        .map_err(|_| CryptarisError::CorruptData(format!("Invalid {} encoding", what)))
}
