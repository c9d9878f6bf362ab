//! Cryptographic building blocks for Cryptaris
//!
//! PBKDF2-HMAC-SHA256 key derivation, single-layer AES-256-GCM, and the
//! dual-layer envelope built from them.

pub mod encryption;
pub mod envelope;
pub mod key_derivation;
pub mod secure_memory;

pub use encryption::{open, seal, OpenError, NONCE_SIZE, TAG_SIZE};
pub use envelope::{EnvelopeCipher, EnvelopeMode, EnvelopeRecord, SystemSecret};
pub use key_derivation::{derive_key, generate_salt, DerivedKey, KEY_SIZE, SALT_SIZE};
pub use secure_memory::SecureString;
