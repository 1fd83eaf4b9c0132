//! In-process remote index.
//!
//! Useful for embedding callers that already hold a listing in memory, and
//! for exercising the walker and generator without a database.

use super::{ChildEntry, EntryId, RemoteIndex};
use crate::utils::{Result, StrmError};
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct Node {
    parent: EntryId,
    name: String,
    is_dir: bool,
    content_handle: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct MemoryIndex {
    nodes: HashMap<EntryId, Node>,
    children: HashMap<EntryId, Vec<EntryId>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directory. Children are listed in insertion order.
    pub fn add_dir(&mut self, id: i64, parent: i64, name: &str) -> &mut Self {
        self.insert(EntryId(id), EntryId(parent), name, true, None)
    }

    /// Add a file with its content handle.
    pub fn add_file(
        &mut self,
        id: i64,
        parent: i64,
        name: &str,
        content_handle: &str,
    ) -> &mut Self {
        self.insert(
            EntryId(id),
            EntryId(parent),
            name,
            false,
            Some(content_handle.to_string()),
        )
    }

    fn insert(
        &mut self,
        id: EntryId,
        parent: EntryId,
        name: &str,
        is_dir: bool,
        content_handle: Option<String>,
    ) -> &mut Self {
        if self.nodes.contains_key(&id) {
            tracing::warn!(%id, "Replacing existing index entry");
            for siblings in self.children.values_mut() {
                siblings.retain(|child| *child != id);
            }
        }
        self.nodes.insert(
            id,
            Node {
                parent,
                name: name.to_string(),
                is_dir,
                content_handle,
            },
        );
        self.children.entry(parent).or_default().push(id);
        self
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl RemoteIndex for MemoryIndex {
    fn contains(&self, id: EntryId) -> Result<bool> {
        Ok(id.is_root() || self.nodes.contains_key(&id))
    }

    fn list_children(&self, parent: EntryId) -> Result<Vec<ChildEntry>> {
        let Some(ids) = self.children.get(&parent) else {
            return Ok(Vec::new());
        };

        Ok(ids
            .iter()
            .filter_map(|id| {
                self.nodes.get(id).map(|node| ChildEntry {
                    id: *id,
                    is_dir: node.is_dir,
                })
            })
            .collect())
    }

    fn resolve_path(&self, id: EntryId) -> Result<String> {
        let mut names = Vec::new();
        let mut current = id;

        while !current.is_root() {
            if names.len() > self.nodes.len() {
                return Err(StrmError::CorruptIndex(format!(
                    "parent cycle through entry {id}"
                )));
            }
            let node = self.nodes.get(&current).ok_or(StrmError::NotFound(current))?;
            names.push(node.name.as_str());
            current = node.parent;
        }

        names.reverse();
        Ok(names.iter().map(|name| format!("/{name}")).collect())
    }

    fn resolve_content_handle(&self, id: EntryId) -> Result<String> {
        self.nodes
            .get(&id)
            .and_then(|node| node.content_handle.clone())
            .ok_or(StrmError::NotFound(id))
    }
}
