//! File I/O utilities with atomic writes
//!
//! Provides safe file operations that won't corrupt data on failure. Readers
//! either see a complete file or no file at all.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use aes_gcm::aead::{rand_core::RngCore, OsRng};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::CryptarisError;

/// Read JSON from a file, returning `None` if the file doesn't exist
pub fn read_json_optional<T, P>(path: P) -> Result<Option<T>, CryptarisError>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(CryptarisError::Storage(format!(
                "Failed to open {}: {}",
                path.display(),
                e
            )))
        }
    };

    let reader = BufReader::new(file);
    serde_json::from_reader(reader)
        .map(Some)
        .map_err(|e| CryptarisError::Storage(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Write JSON to a file atomically (write to temp, then rename)
///
/// The file is either completely written or not modified at all. An existing
/// file at `path` is replaced.
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), CryptarisError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let temp_path = write_temp_json(path, data)?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        CryptarisError::Storage(format!("Failed to rename temp file: {}", e))
    })?;

    sync_parent_dir(path)
}

/// Write JSON to a new file atomically, never replacing an existing one
///
/// The fully synced temp file is hard-linked into place, which fails if the
/// target already exists. Returns `Ok(false)` in that case.
pub fn write_json_new<T, P>(path: P, data: &T) -> Result<bool, CryptarisError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let temp_path = write_temp_json(path, data)?;

    let linked = fs::hard_link(&temp_path, path);
    let _ = fs::remove_file(&temp_path);

    match linked {
        Ok(()) => {
            sync_parent_dir(path)?;
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(CryptarisError::Storage(format!(
            "Failed to link {}: {}",
            path.display(),
            e
        ))),
    }
}

/// Remove a file, returning `Ok(false)` if it was already gone
pub fn remove_if_exists<P: AsRef<Path>>(path: P) -> Result<bool, CryptarisError> {
    let path = path.as_ref();
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(CryptarisError::Storage(format!(
            "Failed to remove {}: {}",
            path.display(),
            e
        ))),
    }
}

/// Serialize `data` into a uniquely named, synced temp file next to `path`
fn write_temp_json<T: Serialize>(path: &Path, data: &T) -> Result<PathBuf, CryptarisError> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(|e| {
        CryptarisError::Storage(format!(
            "Failed to create directory {}: {}",
            parent.display(),
            e
        ))
    })?;

    // Same directory as the target so rename/link stays on one filesystem.
    let temp_path = temp_path_for(path);

    let file = File::options()
        .write(true)
        .create_new(true)
        .open(&temp_path)
        .map_err(|e| CryptarisError::Storage(format!("Failed to create temp file: {}", e)))?;

    let result = (|| {
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, data)
            .map_err(|e| CryptarisError::Storage(format!("Failed to serialize data: {}", e)))?;
        writer
            .flush()
            .map_err(|e| CryptarisError::Storage(format!("Failed to flush data: {}", e)))?;
        writer
            .get_ref()
            .sync_all()
            .map_err(|e| CryptarisError::Storage(format!("Failed to sync data: {}", e)))
    })();

    if let Err(e) = result {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    Ok(temp_path)
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut suffix = [0u8; 8];
    OsRng.fill_bytes(&mut suffix);
    let stem = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.{}.tmp", stem, hex::encode(suffix)))
}

#[cfg(unix)]
fn sync_parent_dir(path: &Path) -> Result<(), CryptarisError> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    File::open(parent)
        .and_then(|dir| dir.sync_all())
        .map_err(|e| CryptarisError::Storage(format!("Failed to sync directory: {}", e)))
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) -> Result<(), CryptarisError> {
    Ok(())
}
