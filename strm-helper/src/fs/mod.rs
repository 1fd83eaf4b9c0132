//! Traversal of the remote tree.

pub mod walker;

pub use walker::{enumerate_files, PathPair};
