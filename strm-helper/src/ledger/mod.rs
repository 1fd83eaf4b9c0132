//! Persistent record of pointer files that have already been generated.
//!
//! The ledger is keyed by pointer path. A key is inserted once, the first
//! time its pointer file is written, and is never updated or removed here.

pub mod memory;
pub mod sqlite;

use crate::utils::Result;
use serde::{Deserialize, Serialize};

pub use memory::MemoryLedger;
pub use sqlite::SqliteLedger;

/// One generated pointer file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    pub pointer_path: String,
    pub content: String,
}

pub trait PointerLedger {
    fn exists(&self, pointer_path: &str) -> Result<bool>;

    /// Record a newly written pointer file. Inserting a key twice is an error.
    fn insert(&mut self, pointer_path: &str, content: &str) -> Result<()>;

    /// Flush pending writes and release the store.
    fn close(self) -> Result<()>
    where
        Self: Sized;
}
