//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the library services.

pub mod encrypt;
pub mod link;
pub mod shred;

pub use encrypt::{handle_decrypt_command, handle_encrypt_command, DecryptCommands, EncryptCommands};
pub use link::{handle_link_command, LinkCommands};
pub use shred::handle_shred_command;
