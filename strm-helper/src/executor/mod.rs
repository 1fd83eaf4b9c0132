//! Generation runs - ties the walker, generator and ledger together.
//!
//! A run walks the index to completion first, then feeds the collected
//! files through the generator one at a time.

use crate::fs::walker::enumerate_files;
use crate::generator::{GenerateOptions, GenerateStats, PointerGenerator, PointerOutcome};
use crate::index::{EntryId, RemoteIndex};
use crate::ledger::{PointerLedger, SqliteLedger};
use crate::utils::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tracing::info_span;

/// Outcome of a whole run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub root_id: EntryId,
    pub written: usize,
    pub filtered_out: usize,
    pub already_generated: usize,
    pub total: usize,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl RunSummary {
    fn new(
        root_id: EntryId,
        stats: GenerateStats,
        started_at: DateTime<Utc>,
        started: Instant,
    ) -> Self {
        Self {
            root_id,
            written: stats.written,
            filtered_out: stats.filtered_out,
            already_generated: stats.already_generated,
            total: stats.total(),
            started_at,
            duration_ms: started.elapsed().as_millis() as u64,
        }
    }
}

/// Generate pointers for every file under `root_id`, using the ledger stored
/// at `ledger_location`.
///
/// Ledger writes are committed once, after the last entry. If the run fails
/// part way, nothing from this run is recorded and the next run rewrites the
/// files it already produced.
pub fn generate_from_index<I>(
    index: &I,
    root_id: EntryId,
    options: &GenerateOptions,
    ledger_location: &Path,
) -> Result<RunSummary>
where
    I: RemoteIndex + ?Sized,
{
    let mut ledger = SqliteLedger::open_batch(ledger_location)?;
    let summary = generate_from_index_with(index, root_id, options, &mut ledger)?;
    ledger.close()?;
    Ok(summary)
}

/// Same as [`generate_from_index`] over a caller-owned ledger. The caller
/// decides when to close (and so commit) it.
pub fn generate_from_index_with<I, L>(
    index: &I,
    root_id: EntryId,
    options: &GenerateOptions,
    ledger: &mut L,
) -> Result<RunSummary>
where
    I: RemoteIndex + ?Sized,
    L: PointerLedger,
{
    let started_at = Utc::now();
    let started = Instant::now();
    let span = info_span!(
        "strm_run",
        root = %root_id,
        target = %options.target_dir().display()
    );

    let removal_prefix = if root_id.is_root() {
        String::new()
    } else {
        index.resolve_path(root_id)?
    };

    let pairs = enumerate_files(index, root_id, &span)?;
    span.in_scope(|| tracing::info!(files = pairs.len(), "Remote tree walked"));

    let stats = PointerGenerator::new(options, ledger, span.clone())
        .generate(index, &pairs, &removal_prefix)?;

    let summary = RunSummary::new(root_id, stats, started_at, started);
    span.in_scope(|| {
        tracing::info!(
            written = summary.written,
            filtered_out = summary.filtered_out,
            already_generated = summary.already_generated,
            duration_ms = summary.duration_ms,
            "Generation run completed"
        )
    });

    Ok(summary)
}

/// Generate the pointer for one remote file whose content handle is already
/// known, without consulting an index.
///
/// `remote_path` is placed under the target directory as-is (a leading `/`
/// is ignored); `.` and `..` segments are rejected. Returns whether a
/// pointer file was written.
pub fn generate_single(
    remote_path: &str,
    content_handle: &str,
    options: &GenerateOptions,
    ledger_location: &Path,
) -> Result<bool> {
    let mut ledger = SqliteLedger::open(ledger_location)?;
    let span = info_span!("strm_single", target = %options.target_dir().display());

    let outcome = PointerGenerator::new(options, &mut ledger, span)
        .generate_one(remote_path, "", || Ok(content_handle.to_string()))?;

    ledger.close()?;
    Ok(outcome == PointerOutcome::Written)
}
