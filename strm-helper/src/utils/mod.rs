//! Utility modules for strm-helper.

pub mod errors;
pub mod logger;

pub use errors::{Result, StrmError};
