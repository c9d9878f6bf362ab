//! In-memory link repository
//!
//! Non-durable; used by tests and by callers that only need process-lifetime
//! links.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{CryptarisError, CryptarisResult};
use crate::models::{LinkId, LinkRecord};

use super::LinkRepository;

/// Repository keeping all records in a `RwLock<HashMap>`
#[derive(Debug, Default)]
pub struct MemoryLinkRepository {
    data: RwLock<HashMap<LinkId, LinkRecord>>,
}

impl MemoryLinkRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }
}

impl LinkRepository for MemoryLinkRepository {
    fn insert(&self, record: &LinkRecord) -> CryptarisResult<()> {
        let mut data = self.data.write().map_err(|e| {
            CryptarisError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        if data.contains_key(&record.id) {
            return Err(CryptarisError::Duplicate {
                entity_type: "Link",
                identifier: record.id.to_string(),
            });
        }
        data.insert(record.id.clone(), record.clone());
        Ok(())
    }

    fn get_by_id(&self, id: &LinkId) -> CryptarisResult<Option<LinkRecord>> {
        let data = self.data.read().map_err(|e| {
            CryptarisError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;
        Ok(data.get(id).cloned())
    }

    fn delete_expired(&self, now: f64) -> CryptarisResult<usize> {
        let mut data = self.data.write().map_err(|e| {
            CryptarisError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        let before = data.len();
        data.retain(|_, record| !record.is_sweepable_at(now));
        Ok(before - data.len())
    }
}
