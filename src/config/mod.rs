//! Configuration module for Cryptaris
//!
//! This module provides configuration management including:
//! - Data directory resolution
//! - User settings persistence
//! - Secrets supplied through the environment

pub mod keys;
pub mod paths;
pub mod settings;

pub use keys::KeyMaterial;
pub use paths::CryptarisPaths;
pub use settings::Settings;
