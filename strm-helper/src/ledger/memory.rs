use super::{LedgerRecord, PointerLedger};
use crate::utils::{Result, StrmError};
use std::collections::BTreeMap;

/// Ledger held entirely in memory; nothing survives `close`.
#[derive(Debug, Default, Clone)]
pub struct MemoryLedger {
    records: BTreeMap<String, String>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> Vec<LedgerRecord> {
        self.records
            .iter()
            .map(|(pointer_path, content)| LedgerRecord {
                pointer_path: pointer_path.clone(),
                content: content.clone(),
            })
            .collect()
    }
}

impl PointerLedger for MemoryLedger {
    fn exists(&self, pointer_path: &str) -> Result<bool> {
        Ok(self.records.contains_key(pointer_path))
    }

    fn insert(&mut self, pointer_path: &str, content: &str) -> Result<()> {
        if self.records.contains_key(pointer_path) {
            return Err(StrmError::DuplicateRecord(pointer_path.to_string()));
        }
        self.records
            .insert(pointer_path.to_string(), content.to_string());
        Ok(())
    }

    fn close(self) -> Result<()> {
        Ok(())
    }
}
