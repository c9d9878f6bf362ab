//! Storage layer for Cryptaris
//!
//! The vault talks to persistence only through [`LinkRepository`], so the
//! backing engine can change without touching vault logic. Two engines ship
//! with the crate: one JSON file per record on disk, and an in-memory map.

pub mod file_io;
pub mod links;
pub mod memory;

pub use file_io::{read_json_optional, write_json_atomic, write_json_new};
pub use links::JsonLinkRepository;
pub use memory::MemoryLinkRepository;

use crate::error::CryptarisResult;
use crate::models::{LinkId, LinkRecord};

/// Persistence for secure link records
///
/// Implementations must make each record write atomic (never observed half
/// written), must not block reads of distinct records on each other, and must
/// delete records atomically one at a time.
pub trait LinkRepository: Send + Sync {
    /// Durably store a new record
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::CryptarisError::Duplicate`] if a record with the
    /// same id already exists; the existing record is left untouched.
    fn insert(&self, record: &LinkRecord) -> CryptarisResult<()>;

    /// Look up a record by id
    fn get_by_id(&self, id: &LinkId) -> CryptarisResult<Option<LinkRecord>>;

    /// Delete every record with a non-zero expiry strictly before `now`
    ///
    /// Returns the number of records removed by this call.
    fn delete_expired(&self, now: f64) -> CryptarisResult<usize>;
}
