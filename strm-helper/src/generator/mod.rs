//! Pointer file generation.
//!
//! For each remote file: rebase its path under the target directory, skip it
//! unless it is a media file that has not been generated before, then write a
//! `.strm` file holding its streaming URL and record it in the ledger.

pub mod pointer;

use crate::fs::walker::PathPair;
use crate::index::RemoteIndex;
use crate::ledger::PointerLedger;
use crate::utils::Result;
use serde::Serialize;
use std::fs;
use tracing::Span;

pub use pointer::{
    pointer_content, rebase, GenerateOptions, MediaExtensions, PointerTarget,
    DEFAULT_MEDIA_EXTENSIONS, POINTER_EXTENSION,
};

/// What happened to a single remote file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerOutcome {
    Written,
    FilteredOut,
    AlreadyGenerated,
}

/// Per-outcome counters for a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GenerateStats {
    pub written: usize,
    pub filtered_out: usize,
    pub already_generated: usize,
}

impl GenerateStats {
    pub fn record(&mut self, outcome: PointerOutcome) {
        match outcome {
            PointerOutcome::Written => self.written += 1,
            PointerOutcome::FilteredOut => self.filtered_out += 1,
            PointerOutcome::AlreadyGenerated => self.already_generated += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.written + self.filtered_out + self.already_generated
    }
}

pub struct PointerGenerator<'a, L: PointerLedger> {
    options: &'a GenerateOptions,
    ledger: &'a mut L,
    span: Span,
}

impl<'a, L: PointerLedger> PointerGenerator<'a, L> {
    pub fn new(options: &'a GenerateOptions, ledger: &'a mut L, span: Span) -> Self {
        Self {
            options,
            ledger,
            span,
        }
    }

    /// Run the per-entry cycle over every walked file, in order.
    ///
    /// Skips never abort the batch; storage errors do.
    pub fn generate<I>(
        &mut self,
        index: &I,
        pairs: &[PathPair],
        removal_prefix: &str,
    ) -> Result<GenerateStats>
    where
        I: RemoteIndex + ?Sized,
    {
        let mut stats = GenerateStats::default();
        for pair in pairs {
            let outcome = self.generate_one(&pair.remote_path, removal_prefix, || {
                index.resolve_content_handle(pair.entry_id)
            })?;
            stats.record(outcome);
        }
        Ok(stats)
    }

    /// Generate the pointer for one remote file.
    ///
    /// `content_handle` is only called once the file passed the extension
    /// filter and the ledger check.
    pub fn generate_one<F>(
        &mut self,
        remote_path: &str,
        removal_prefix: &str,
        content_handle: F,
    ) -> Result<PointerOutcome>
    where
        F: FnOnce() -> Result<String>,
    {
        let local_path = rebase(remote_path, removal_prefix, self.options.target_dir())?;
        let target = PointerTarget::from_local_path(local_path);

        if !self.options.media_extensions().allows(&target.suffix) {
            tracing::warn!(parent: &self.span, remote_path, "Skipping non-media file");
            return Ok(PointerOutcome::FilteredOut);
        }

        let key = target.pointer_key();
        if self.ledger.exists(&key)? {
            tracing::warn!(
                parent: &self.span,
                pointer = %key,
                "Skipping, pointer already generated"
            );
            return Ok(PointerOutcome::AlreadyGenerated);
        }

        let handle = content_handle()?;
        let content = pointer_content(self.options.server_base_url(), &handle, &target.file_name);

        if let Some(parent) = target.pointer_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target.pointer_path, content.as_bytes())?;

        self.ledger.insert(&key, &content)?;
        tracing::info!(parent: &self.span, pointer = %key, "Generated pointer file");

        Ok(PointerOutcome::Written)
    }
}
