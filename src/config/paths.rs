//! Path management for Cryptaris
//!
//! ## Path Resolution Order
//!
//! 1. `CRYPTARIS_DATA_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_DATA_HOME/cryptaris` or `~/.local/share/cryptaris`
//! 3. Windows: `%APPDATA%\cryptaris`

use std::path::PathBuf;

use crate::error::CryptarisError;

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "CRYPTARIS_DATA_DIR";

/// Manages all paths used by Cryptaris
#[derive(Debug, Clone)]
pub struct CryptarisPaths {
    /// Base directory for all Cryptaris data
    base_dir: PathBuf,
}

impl CryptarisPaths {
    /// Create a new CryptarisPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, CryptarisError> {
        let base_dir = match std::env::var(DATA_DIR_ENV) {
            Ok(custom) if !custom.is_empty() => PathBuf::from(custom),
            _ => resolve_default_path()?,
        };

        Ok(Self { base_dir })
    }

    /// Create CryptarisPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the directory holding one JSON file per secure link
    pub fn links_dir(&self) -> PathBuf {
        self.base_dir.join("links")
    }

    /// Ensure all required directories exist
    pub fn ensure_directories(&self) -> Result<(), CryptarisError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| CryptarisError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.links_dir())
            .map_err(|e| CryptarisError::Io(format!("Failed to create links directory: {}", e)))?;

        Ok(())
    }

    /// Check if Cryptaris has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

/// Resolve the default data directory path based on platform
#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, CryptarisError> {
    if let Ok(data_home) = std::env::var("XDG_DATA_HOME") {
        if !data_home.is_empty() {
            return Ok(PathBuf::from(data_home).join("cryptaris"));
        }
    }
    let home = std::env::var("HOME")
        .map_err(|_| CryptarisError::Config("HOME environment variable not set".into()))?;
    Ok(PathBuf::from(home)
        .join(".local")
        .join("share")
        .join("cryptaris"))
}

/// Resolve the default data directory path based on platform
#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, CryptarisError> {
    let appdata = std::env::var("APPDATA")
        .map_err(|_| CryptarisError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("cryptaris"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = CryptarisPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.links_dir(), temp_dir.path().join("links"));
        assert_eq!(paths.settings_file(), temp_dir.path().join("config.json"));
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = CryptarisPaths::with_base_dir(temp_dir.path().join("nested"));

        paths.ensure_directories().unwrap();

        assert!(paths.links_dir().exists());
        assert!(!paths.is_initialized());
    }
}
