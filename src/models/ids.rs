//! Link identifiers
//!
//! A [`LinkId`] is 12 URL-safe characters drawn from 72 random bits. Parsing
//! is strict so an id can be used directly as a storage key or file stem.

use std::fmt;
use std::str::FromStr;

use aes_gcm::aead::{rand_core::RngCore, OsRng};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};

use crate::error::CryptarisError;

/// Length of a link id in characters
pub const LINK_ID_LEN: usize = 12;

/// Random bytes behind each id (9 bytes encode to exactly 12 base64 chars)
const LINK_ID_BYTES: usize = 9;

/// Identifier of a stored secure link
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LinkId(String);

impl LinkId {
    /// Create a new random ID
    pub fn new() -> Self {
        let mut bytes = [0u8; LINK_ID_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Parse an ID from a string
    ///
    /// # Errors
    ///
    /// Returns a validation error unless `s` is exactly [`LINK_ID_LEN`]
    /// characters of `[A-Za-z0-9_-]`.
    pub fn parse(s: &str) -> Result<Self, CryptarisError> {
        let valid = s.len() == LINK_ID_LEN
            && s
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        if valid {
            Ok(Self(s.to_string()))
        } else {
            Err(CryptarisError::Validation(format!("Invalid link id: {:?}", s)))
        }
    }

    /// Get the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for LinkId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LinkId {
    type Err = CryptarisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for LinkId {
    type Error = CryptarisError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<LinkId> for String {
    fn from(id: LinkId) -> Self {
        id.0
    }
}
