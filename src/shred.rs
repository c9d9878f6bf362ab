//! Secure file deletion
//!
//! Overwrites a file in place with rotating fill patterns (zeros, ones,
//! random), syncing to the device after every pass, then renames it to a
//! random name and unlinks that name so the original directory entry never
//! points at the freed blocks.
//!
//! Overwriting is best-effort on journaling or copy-on-write filesystems and
//! SSDs with wear levelling; removing the directory entry is the guaranteed
//! minimum.

use std::fs::{self, File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use aes_gcm::aead::{rand_core::RngCore, OsRng};

use crate::error::{CryptarisError, CryptarisResult};

/// Default number of overwrite passes
pub const DEFAULT_PASSES: u32 = 3;

/// Chunk size for pattern writes; bounds memory use independent of file size
pub const CHUNK_SIZE: usize = 1024 * 1024;

/// Fill pattern for a single overwrite pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillPattern {
    /// All `0x00`
    Zeros,
    /// All `0xFF`
    Ones,
    /// Cryptographically random bytes
    Random,
}

impl FillPattern {
    /// Pattern used for pass `index`
    pub fn for_pass(index: u32) -> Self {
        match index % 3 {
            0 => Self::Zeros,
            1 => Self::Ones,
            _ => Self::Random,
        }
    }

    fn fill(self, buf: &mut [u8]) {
        match self {
            Self::Zeros => buf.fill(0x00),
            Self::Ones => buf.fill(0xFF),
            Self::Random => OsRng.fill_bytes(buf),
        }
    }
}

/// Shred a file, reporting success as a boolean
///
/// Returns `false` without side effects if `path` does not exist. On any
/// failure mid-shred the file is unlinked directly as a fallback and `false`
/// is returned.
pub fn shred_file(path: impl AsRef<Path>, passes: u32) -> bool {
    let path = path.as_ref();
    match try_shred_file(path, passes) {
        Ok(()) => true,
        Err(e) if e.is_not_found() => false,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Shred failed");
            false
        }
    }
}

/// Shred a file, reporting failures as typed errors
///
/// # Errors
///
/// - `NotFound` if `path` does not exist (nothing is touched)
/// - `Validation` if `passes` is zero or `path` is not a regular file
/// - `Io` if a pass or the final unlink could not complete; a direct unlink
///   of whatever still exists has already been attempted
pub fn try_shred_file(path: impl AsRef<Path>, passes: u32) -> CryptarisResult<()> {
    let path = path.as_ref();

    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(CryptarisError::file_not_found(path.display().to_string()))
        }
        Err(e) => return Err(CryptarisError::Io(format!("Failed to stat file: {}", e))),
    };
    if !metadata.is_file() {
        return Err(CryptarisError::Validation(format!(
            "Not a regular file: {}",
            path.display()
        )));
    }
    if passes == 0 {
        return Err(CryptarisError::Validation(
            "At least one overwrite pass is required".to_string(),
        ));
    }

    if metadata.len() == 0 {
        fs::remove_file(path)
            .map_err(|e| CryptarisError::Io(format!("Failed to remove empty file: {}", e)))?;
        return Ok(());
    }

    let mut current = path.to_path_buf();
    match overwrite_and_unlink(&mut current, metadata.len(), passes) {
        Ok(()) => {
            tracing::debug!(passes, size = metadata.len(), "File shredded");
            Ok(())
        }
        Err(e) => {
            if current.exists() {
                if let Err(unlink_err) = fs::remove_file(&current) {
                    tracing::warn!(error = %unlink_err, "Fallback unlink failed");
                }
            }
            Err(e)
        }
    }
}

/// Overwrite, rename and unlink; `current` tracks where the file lives now
fn overwrite_and_unlink(current: &mut PathBuf, len: u64, passes: u32) -> CryptarisResult<()> {
    {
        let mut file = OpenOptions::new()
            .write(true)
            .open(&*current)
            .map_err(|e| CryptarisError::Io(format!("Failed to open file for overwrite: {}", e)))?;

        let mut buf = vec![0u8; CHUNK_SIZE.min(len as usize)];
        for pass in 0..passes {
            overwrite_pass(&mut file, &mut buf, len, FillPattern::for_pass(pass)).map_err(|e| {
                CryptarisError::Io(format!("Overwrite pass {} failed: {}", pass + 1, e))
            })?;
        }
    }

    let obscured = obscured_path(current);
    fs::rename(&*current, &obscured)
        .map_err(|e| CryptarisError::Io(format!("Failed to rename file: {}", e)))?;
    *current = obscured;

    fs::remove_file(&*current)
        .map_err(|e| CryptarisError::Io(format!("Failed to unlink file: {}", e)))
}

/// Write `len` bytes of `pattern` from offset 0 and sync to the device
fn overwrite_pass(
    file: &mut File,
    buf: &mut [u8],
    len: u64,
    pattern: FillPattern,
) -> std::io::Result<()> {
    file.seek(SeekFrom::Start(0))?;

    if pattern != FillPattern::Random {
        pattern.fill(buf);
    }

    let mut remaining = len;
    while remaining > 0 {
        let chunk = remaining.min(buf.len() as u64) as usize;
        if pattern == FillPattern::Random {
            pattern.fill(&mut buf[..chunk]);
        }
        file.write_all(&buf[..chunk])?;
        remaining -= chunk as u64;
    }

    file.flush()?;
    file.sync_all()
}

/// A random, content-unrelated name in the same directory
fn obscured_path(path: &Path) -> PathBuf {
    loop {
        let mut name = [0u8; 16];
        OsRng.fill_bytes(&mut name);
        let candidate = path.with_file_name(format!("{}.tmp", hex::encode(name)));
        if !candidate.exists() {
            return candidate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entries(dir: &Path) -> usize {
        fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn test_pattern_rotation() {
        assert_eq!(FillPattern::for_pass(0), FillPattern::Zeros);
        assert_eq!(FillPattern::for_pass(1), FillPattern::Ones);
        assert_eq!(FillPattern::for_pass(2), FillPattern::Random);
        assert_eq!(FillPattern::for_pass(3), FillPattern::Zeros);
        assert_eq!(FillPattern::for_pass(7), FillPattern::Ones);
    }

    #[test]
    fn test_shred_removes_file_and_leaves_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("secret.txt");
        fs::write(&path, b"top secret plaintext").unwrap();

        assert!(shred_file(&path, DEFAULT_PASSES));
        assert!(!path.exists());
        assert_eq!(entries(temp_dir.path()), 0);
    }

    #[test]
    fn test_shred_empty_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty.txt");
        File::create(&path).unwrap();

        assert!(shred_file(&path, DEFAULT_PASSES));
        assert!(!path.exists());
        assert_eq!(entries(temp_dir.path()), 0);
    }

    #[test]
    fn test_shred_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.txt");

        assert!(!shred_file(&path, DEFAULT_PASSES));
        assert!(try_shred_file(&path, DEFAULT_PASSES).unwrap_err().is_not_found());
    }

    #[test]
    fn test_shred_multi_chunk_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("large.bin");
        fs::write(&path, vec![0xA5u8; CHUNK_SIZE * 2 + 17]).unwrap();

        assert!(shred_file(&path, 5));
        assert_eq!(entries(temp_dir.path()), 0);
    }

    #[test]
    fn test_overwrite_pass_writes_pattern() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("probe.bin");
        fs::write(&path, b"plaintext").unwrap();

        let mut file = OpenOptions::new().write(true).open(&path).unwrap();
        let mut buf = vec![0u8; 4];
        overwrite_pass(&mut file, &mut buf, 9, FillPattern::Ones).unwrap();
        drop(file);

        assert_eq!(fs::read(&path).unwrap(), vec![0xFFu8; 9]);
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_overwrite_falls_back_to_unlink() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("readonly.txt");
        fs::write(&path, b"cannot overwrite me").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o444)).unwrap();

        // Privileged users can open read-only files for writing.
        if OpenOptions::new().write(true).open(&path).is_ok() {
            return;
        }

        let err = try_shred_file(&path, DEFAULT_PASSES).unwrap_err();
        assert!(matches!(err, CryptarisError::Io(_)));
        assert!(!path.exists());
        assert_eq!(entries(temp_dir.path()), 0);

        fs::write(&path, b"again").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o444)).unwrap();
        assert!(!shred_file(&path, DEFAULT_PASSES));
        assert!(!path.exists());
    }

    #[test]
    fn test_zero_passes_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("keep.txt");
        fs::write(&path, b"data").unwrap();

        assert!(try_shred_file(&path, 0).unwrap_err().is_validation());
        assert!(path.exists());
    }

    #[test]
    fn test_directories_rejected() {
        let temp_dir = TempDir::new().unwrap();
        assert!(!shred_file(temp_dir.path(), 1));
        assert!(temp_dir.path().exists());
    }
}
