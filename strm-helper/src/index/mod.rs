//! Read-only access to the remote file index.
//!
//! The index is built and refreshed by an external tool; this crate only
//! queries it for child listings, full paths and content handles.

pub mod memory;
pub mod refresh;
pub mod sqlite;

use crate::utils::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use memory::MemoryIndex;
pub use refresh::{CommandRefresher, IndexRefresher};
pub use sqlite::SqliteIndex;

/// Identifier of an entry in the remote index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub i64);

impl EntryId {
    /// Sentinel for the index root. It has no row of its own.
    pub const ROOT: EntryId = EntryId(0);

    pub fn is_root(self) -> bool {
        self == Self::ROOT
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for EntryId {
    fn from(id: i64) -> Self {
        EntryId(id)
    }
}

/// One row of a child listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildEntry {
    pub id: EntryId,
    pub is_dir: bool,
}

/// Lookup primitives the traversal and generation stages depend on.
pub trait RemoteIndex {
    /// Whether `id` names an entry. The root sentinel is always present.
    fn contains(&self, id: EntryId) -> Result<bool>;

    /// Live children of `parent`, in index order.
    fn list_children(&self, parent: EntryId) -> Result<Vec<ChildEntry>>;

    /// Full `/`-separated remote path of `id`; the root resolves to `""`.
    fn resolve_path(&self, id: EntryId) -> Result<String>;

    /// Opaque handle the streaming server uses to locate the file's bytes.
    fn resolve_content_handle(&self, id: EntryId) -> Result<String>;
}
