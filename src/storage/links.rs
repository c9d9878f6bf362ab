//! Link repository for JSON storage
//!
//! Each record lives in its own file, `<dir>/<id>.json`. Inserts go through
//! [`write_json_new`] so a record appears all at once and an existing id is
//! never overwritten. Lookups open one file and never contend with each
//! other; expiry sweeps unlink files individually.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{CryptarisError, CryptarisResult};
use crate::models::{LinkId, LinkRecord};

use super::file_io::{read_json_optional, remove_if_exists, write_json_new};
use super::LinkRepository;

const RECORD_EXTENSION: &str = "json";

/// Repository storing one JSON document per link
#[derive(Debug, Clone)]
pub struct JsonLinkRepository {
    dir: PathBuf,
}

impl JsonLinkRepository {
    /// Open (creating if needed) a repository rooted at `dir`
    pub fn open(dir: impl Into<PathBuf>) -> CryptarisResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            CryptarisError::Storage(format!(
                "Failed to create link directory {}: {}",
                dir.display(),
                e
            ))
        })?;
        Ok(Self { dir })
    }

    /// Directory holding the record files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, id: &LinkId) -> PathBuf {
        self.dir
            .join(format!("{}.{}", id.as_str(), RECORD_EXTENSION))
    }

    /// Paths of all committed record files
    fn record_paths(&self) -> CryptarisResult<Vec<PathBuf>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(CryptarisError::Storage(format!(
                    "Failed to read link directory: {}",
                    e
                )))
            }
        };

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                CryptarisError::Storage(format!("Failed to read directory entry: {}", e))
            })?;
            let path = entry.path();
            let is_record = path
                .extension()
                .map(|ext| ext == RECORD_EXTENSION)
                .unwrap_or(false);
            let is_hidden = entry.file_name().to_string_lossy().starts_with('.');
            if is_record && !is_hidden {
                paths.push(path);
            }
        }
        Ok(paths)
    }
}

impl LinkRepository for JsonLinkRepository {
    fn insert(&self, record: &LinkRecord) -> CryptarisResult<()> {
        let created = write_json_new(self.record_path(&record.id), record)?;
        if !created {
            return Err(CryptarisError::Duplicate {
                entity_type: "Link",
                identifier: record.id.to_string(),
            });
        }
        Ok(())
    }

    fn get_by_id(&self, id: &LinkId) -> CryptarisResult<Option<LinkRecord>> {
        read_json_optional(self.record_path(id))
    }

    fn delete_expired(&self, now: f64) -> CryptarisResult<usize> {
        let mut removed = 0;
        for path in self.record_paths()? {
            // A concurrent sweep may already have taken this one.
            let record: LinkRecord = match read_json_optional(&path) {
                Ok(Some(record)) => record,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable link record");
                    continue;
                }
            };

            if record.is_sweepable_at(now) && remove_if_exists(&path)? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::link::fixtures::record_with_expiry;
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    fn repo() -> (TempDir, JsonLinkRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = JsonLinkRepository::open(temp_dir.path().join("links")).unwrap();
        (temp_dir, repo)
    }

    #[test]
    fn test_open_creates_directory() {
        let (temp_dir, repo) = repo();
        assert!(repo.dir().exists());
        assert_eq!(repo.dir(), temp_dir.path().join("links"));
    }

    #[test]
    fn test_insert_and_get() {
        let (_temp_dir, repo) = repo();
        let record = record_with_expiry(0.0);

        repo.insert(&record).unwrap();
        assert_eq!(repo.get_by_id(&record.id).unwrap(), Some(record.clone()));
        assert!(repo.dir().join(format!("{}.json", record.id)).exists());
    }

    #[test]
    fn test_missing_record_is_none() {
        let (_temp_dir, repo) = repo();
        assert_eq!(repo.get_by_id(&LinkId::new()).unwrap(), None);
    }

    #[test]
    fn test_duplicate_insert_keeps_original() {
        let (_temp_dir, repo) = repo();
        let record = record_with_expiry(0.0);
        repo.insert(&record).unwrap();

        let mut clash = record_with_expiry(42.0);
        clash.id = record.id.clone();
        assert!(repo.insert(&clash).unwrap_err().is_duplicate());
        assert_eq!(repo.get_by_id(&record.id).unwrap(), Some(record));
    }

    #[test]
    fn test_records_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let record = record_with_expiry(0.0);
        {
            let repo = JsonLinkRepository::open(temp_dir.path()).unwrap();
            repo.insert(&record).unwrap();
        }
        let reopened = JsonLinkRepository::open(temp_dir.path()).unwrap();
        assert_eq!(reopened.get_by_id(&record.id).unwrap(), Some(record));
    }

    #[test]
    fn test_delete_expired() {
        let (_temp_dir, repo) = repo();
        let never = record_with_expiry(0.0);
        let old = record_with_expiry(10.0);
        let future = record_with_expiry(1000.0);
        for r in [&never, &old, &future] {
            repo.insert(r).unwrap();
        }

        assert_eq!(repo.delete_expired(500.0).unwrap(), 1);
        assert_eq!(repo.delete_expired(500.0).unwrap(), 0);
        assert!(repo.get_by_id(&old.id).unwrap().is_none());
        assert!(repo.get_by_id(&never.id).unwrap().is_some());
        assert!(repo.get_by_id(&future.id).unwrap().is_some());
    }

    #[test]
    fn test_sweep_ignores_foreign_files() {
        let (_temp_dir, repo) = repo();
        fs::write(repo.dir().join("notes.txt"), "hello").unwrap();
        fs::write(repo.dir().join("broken.json"), "{").unwrap();

        assert_eq!(repo.delete_expired(1e12).unwrap(), 0);
        assert!(repo.dir().join("notes.txt").exists());
    }

    #[test]
    fn test_concurrent_sweeps_and_reads() {
        let (_temp_dir, repo) = repo();
        let repo = Arc::new(repo);

        let expired: Vec<_> = (0..20).map(|_| record_with_expiry(1.0)).collect();
        let live = record_with_expiry(0.0);
        for r in &expired {
            repo.insert(r).unwrap();
        }
        repo.insert(&live).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let repo = Arc::clone(&repo);
                let live_id = live.id.clone();
                thread::spawn(move || {
                    let removed = repo.delete_expired(100.0).unwrap();
                    assert!(repo.get_by_id(&live_id).unwrap().is_some());
                    removed
                })
            })
            .collect();

        let total: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(total, expired.len());
    }
}
