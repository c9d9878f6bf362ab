//! Secure link record model
//!
//! A [`LinkRecord`] is created once and never updated; the only other
//! lifecycle event is whole-record deletion once it has expired.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::LinkId;

/// Current time as fractional seconds since the Unix epoch
pub fn epoch_seconds_now() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// A persisted secure link
///
/// Payloads are encrypted under the vault key. The URL nonce is stored in its
/// own field; the file payload is packed as `base64(nonce):base64(ciphertext)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkRecord {
    /// Primary key
    pub id: LinkId,

    /// Encrypted URL (base64); encrypts the empty string when no URL was given
    pub encrypted_url: String,

    /// Nonce for `encrypted_url` (base64)
    pub url_nonce: String,

    /// Hex SHA-256 of the access password, if the link is password gated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,

    /// Expiry as epoch seconds; `0` means the link never expires
    #[serde(default)]
    pub expiry: f64,

    /// Creation time as epoch seconds
    pub created_at: f64,

    /// Packed encrypted file payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted_file: Option<String>,

    /// Sanitized original file name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

impl LinkRecord {
    /// Whether the record carries an expiry at all
    pub fn expires(&self) -> bool {
        self.expiry != 0.0
    }

    /// Whether the record is past its expiry at `now`
    pub fn is_expired_at(&self, now: f64) -> bool {
        self.expires() && now > self.expiry
    }

    /// Whether the record should be removed by a cleanup sweep at `now`
    pub fn is_sweepable_at(&self, now: f64) -> bool {
        self.expires() && self.expiry < now
    }

    /// Whether the link is password gated
    pub fn is_password_protected(&self) -> bool {
        self.password_hash.is_some()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// A record with placeholder ciphertext, for storage tests
    pub fn record_with_expiry(expiry: f64) -> LinkRecord {
        LinkRecord {
            id: LinkId::new(),
            encrypted_url: "AAAA".to_string(),
            url_nonce: "AAAAAAAAAAAAAAAA".to_string(),
            password_hash: None,
            expiry,
            created_at: epoch_seconds_now(),
            encrypted_file: None,
            file_name: None,
        }
    }
}
