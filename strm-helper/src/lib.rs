//! strm-helper library
//!
//! Mirrors an indexed cloud-storage tree into local `.strm` pointer files,
//! each holding a streaming URL for one remote media file.

pub mod config;
pub mod db;
pub mod executor;
pub mod fs;
pub mod generator;
pub mod index;
pub mod ledger;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use executor::{generate_from_index, generate_from_index_with, generate_single, RunSummary};
pub use generator::{GenerateOptions, MediaExtensions, PointerOutcome};
pub use index::{EntryId, RemoteIndex};
pub use ledger::PointerLedger;
pub use utils::errors::StrmError;
pub type Result<T> = std::result::Result<T, StrmError>;
