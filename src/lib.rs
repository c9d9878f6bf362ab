//! Cryptaris - confidential, tamper-evident storage of secrets
//!
//! This library provides the core functionality for the Cryptaris command
//! line tool: password-based encryption of text and files, expiring
//! password-gated secure links, and secure deletion of plaintext remnants.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `crypto`: Key derivation, AEAD primitives and the dual-layer envelope
//! - `vault`: Secure link creation, access and expiry
//! - `models`: Link records and ids
//! - `storage`: Link repositories (JSON files, in-memory)
//! - `shred`: Overwrite-then-unlink file deletion
//! - `config`: Paths, settings and key material
//! - `error`: Custom error types
//! - `cli`: Command handlers for the `cryptaris` binary
//!
//! # Example
//!
//! ```rust,ignore
//! use cryptaris::crypto::{EnvelopeCipher, SystemSecret};
//!
//! let cipher = EnvelopeCipher::new(SystemSecret::new("system secret"));
//! let record = cipher.encrypt(b"attack at dawn", "hunter2")?;
//! let plaintext = cipher.decrypt(&record, "hunter2")?;
//! ```

pub mod cli;
pub mod config;
pub mod crypto;
pub mod error;
pub mod models;
pub mod shred;
pub mod storage;
pub mod vault;

pub use error::{CryptarisError, CryptarisResult};
