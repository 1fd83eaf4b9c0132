//! Custom error types for strm-helper.

use crate::index::EntryId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StrmError {
    #[error("Index entry not found: {0}")]
    NotFound(EntryId),

    #[error("Corrupt index: {0}")]
    CorruptIndex(String),

    #[error("Remote path {path:?} does not start with prefix {prefix:?}")]
    PathOutsidePrefix { path: String, prefix: String },

    #[error("Remote path {path:?} contains relative segment {segment:?}")]
    RelativeSegment { path: String, segment: String },

    #[error("Pointer already recorded in ledger: {0}")]
    DuplicateRecord(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Index refresh failed: {0}")]
    Refresh(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StrmError>;
