//! Custom error types for Cryptaris
//!
//! Every failure surfaced by the library is one of these kinds, so callers can
//! branch on the kind (wrong password vs. foreign record vs. expired link)
//! instead of matching on message text.

use thiserror::Error;

/// The main error type for Cryptaris operations
#[derive(Error, Debug)]
pub enum CryptarisError {
    /// Malformed or missing input
    #[error("Validation error: {0}")]
    Validation(String),

    /// The user layer of an envelope failed tag verification
    #[error("User authentication failed: incorrect password")]
    AuthenticationFailure,

    /// The system layer of an envelope failed tag verification
    #[error(
        "System integrity check failed: data was not encrypted by this instance or has been tampered with"
    )]
    IntegrityFailure,

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors (primary-key collision)
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// The link is past its time-to-live
    #[error("Link has expired: {0}")]
    Expired(String),

    /// The link is password protected and no password was supplied
    #[error("Password required")]
    PasswordRequired,

    /// The supplied link password does not match
    #[error("Incorrect password")]
    IncorrectPassword,

    /// A stored payload passed the access gates but failed to decrypt
    #[error("Decryption failed, data corruption: {0}")]
    CorruptData(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Failures while producing ciphertext
    #[error("Encryption error: {0}")]
    Encryption(String),
}

impl CryptarisError {
    /// Create a "not found" error for secure links
    pub fn link_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Link",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for filesystem paths
    pub fn file_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "File",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a primary-key collision
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }
}

impl From<std::io::Error> for CryptarisError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for CryptarisError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for Cryptaris operations
pub type CryptarisResult<T> = Result<T, CryptarisError>;
