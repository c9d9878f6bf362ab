//! User settings for Cryptaris
//!
//! Persisted preferences: share reference prefix, default link lifetime and
//! shred pass count. Secrets never live here; see [`super::keys`].

use serde::{Deserialize, Serialize};

use super::paths::CryptarisPaths;
use crate::error::CryptarisError;
use crate::shred::DEFAULT_PASSES;
use crate::storage::write_json_atomic;
use crate::vault::DEFAULT_SHARE_BASE_URL;

/// User settings for Cryptaris
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Prefix for share references handed out by `link create`
    #[serde(default = "default_share_base_url")]
    pub share_base_url: String,

    /// Link lifetime used when none is given; `0` never expires
    #[serde(default = "default_link_ttl_seconds")]
    pub default_link_ttl_seconds: u64,

    /// Overwrite passes used when shredding
    #[serde(default = "default_shred_passes")]
    pub shred_passes: u32,
}

fn default_schema_version() -> u32 {
    1
}

fn default_share_base_url() -> String {
    DEFAULT_SHARE_BASE_URL.to_string()
}

fn default_link_ttl_seconds() -> u64 {
    3600
}

fn default_shred_passes() -> u32 {
    DEFAULT_PASSES
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            share_base_url: default_share_base_url(),
            default_link_ttl_seconds: default_link_ttl_seconds(),
            shred_passes: default_shred_passes(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &CryptarisPaths) -> Result<Self, CryptarisError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                CryptarisError::Io(format!("Failed to read settings file: {}", e))
            })?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                CryptarisError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            settings.validate()?;
            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &CryptarisPaths) -> Result<(), CryptarisError> {
        paths.ensure_directories()?;
        write_json_atomic(paths.settings_file(), self)
    }

    /// Reject settings the rest of the crate cannot honor
    pub fn validate(&self) -> Result<(), CryptarisError> {
        if self.shred_passes == 0 {
            return Err(CryptarisError::Config(
                "shred_passes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.share_base_url, "https://cryptaris.io/s/");
        assert_eq!(settings.default_link_ttl_seconds, 3600);
        assert_eq!(settings.shred_passes, 3);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = CryptarisPaths::with_base_dir(temp_dir.path().to_path_buf());

        let settings = Settings {
            share_base_url: "https://share.internal/l/".to_string(),
            shred_passes: 7,
            ..Settings::default()
        };
        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"shred_passes": 1}"#).unwrap();
        assert_eq!(settings.shred_passes, 1);
        assert_eq!(settings.default_link_ttl_seconds, 3600);
    }

    #[test]
    fn test_zero_passes_rejected_on_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = CryptarisPaths::with_base_dir(temp_dir.path().to_path_buf());
        std::fs::write(paths.settings_file(), r#"{"shred_passes": 0}"#).unwrap();

        let err = Settings::load_or_create(&paths).unwrap_err();
        assert!(matches!(err, CryptarisError::Config(_)));
    }
}
