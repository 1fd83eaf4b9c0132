//! Remote tree traversal driven by the index.
//!
//! Walks every file reachable under a starting folder and pairs its full
//! remote path with its entry id. Traversal is depth-first in the index's
//! child-listing order, using an explicit stack so deep trees cannot exhaust
//! the call stack.

use crate::index::{ChildEntry, EntryId, RemoteIndex};
use crate::utils::{Result, StrmError};
use std::collections::HashSet;
use tracing::Span;

/// A remote file discovered during walking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPair {
    /// Full remote path, e.g. `/Movies/Inception.mkv`
    pub remote_path: String,

    /// The file's own entry id, used later to fetch its content handle
    pub entry_id: EntryId,
}

/// Walk the index below `root` and collect all files
///
/// # Arguments
/// * `index` - Remote index to query
/// * `root` - Starting folder, or [`EntryId::ROOT`] for the whole index
/// * `span` - Span the traversal events are recorded under
///
/// # Returns
/// * `Ok(Vec<PathPair>)` - Every file below `root`, in traversal order
/// * `Err(StrmError::NotFound)` - If `root` is not in the index
pub fn enumerate_files<I>(index: &I, root: EntryId, span: &Span) -> Result<Vec<PathPair>>
where
    I: RemoteIndex + ?Sized,
{
    let mut files = Vec::new();
    walk_index_with_callback(index, root, span, |pair| files.push(pair))?;
    Ok(files)
}

/// Walk the index below `root` with a callback for each file
///
/// Returns the number of directories visited, `root` included.
pub fn walk_index_with_callback<I, F>(
    index: &I,
    root: EntryId,
    span: &Span,
    mut callback: F,
) -> Result<usize>
where
    I: RemoteIndex + ?Sized,
    F: FnMut(PathPair),
{
    if !index.contains(root)? {
        return Err(StrmError::NotFound(root));
    }

    let mut visited = HashSet::from([root]);
    let mut stack: Vec<std::vec::IntoIter<ChildEntry>> =
        vec![index.list_children(root)?.into_iter()];

    while let Some(level) = stack.last_mut() {
        let Some(child) = level.next() else {
            stack.pop();
            continue;
        };

        if child.is_dir {
            // A directory reachable twice means the index has a cycle
            if !visited.insert(child.id) {
                tracing::warn!(
                    parent: span,
                    id = %child.id,
                    "Directory already visited, skipping"
                );
                continue;
            }
            tracing::debug!(
                parent: span,
                id = %child.id,
                depth = stack.len(),
                "Entering directory"
            );
            stack.push(index.list_children(child.id)?.into_iter());
        } else {
            let remote_path = index.resolve_path(child.id)?;
            callback(PathPair {
                remote_path,
                entry_id: child.id,
            });
        }
    }

    Ok(visited.len())
}
