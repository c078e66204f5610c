#![forbid(unsafe_code)]

use super::files::{read_card_file, scan_card_files};
use super::{bundle_from_card_file, CardContext, CardOpError};
use cg_core::key::CardKey;
use std::path::Path;

#[derive(Clone, Debug)]
pub(crate) struct SyncOutcome {
    pub key: String,
    pub warnings: Vec<String>,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct BulkSyncReport {
    pub synced: usize,
    pub failures: Vec<SyncFailure>,
    pub warnings: Vec<String>,
}

#[derive(Clone, Debug)]
pub(crate) struct SyncFailure {
    pub file_path: String,
    pub error: String,
}

/// File -> index projection. The front matter decides the key; a header
/// that disagrees with the filename is synced as written and left for the
/// validate report to surface.
pub(crate) fn sync_card_from_file(
    ctx: &CardContext,
    path: &Path,
) -> Result<SyncOutcome, CardOpError> {
    sync_file_into_store(ctx, path)
}

/// Lock-free inner sync, shared with the write compensators (which already
/// hold the key lock).
pub(in crate::ops) fn sync_file_into_store(
    ctx: &CardContext,
    path: &Path,
) -> Result<SyncOutcome, CardOpError> {
    let file = read_card_file(path)?;
    let key = CardKey::parse(&file.front_matter.key)?;
    let bundle = bundle_from_card_file(&file, path);
    let warnings = ctx.store().sync_card(&bundle)?;
    Ok(SyncOutcome {
        key: key.into_string(),
        warnings,
    })
}

/// Index-side removal for an externally deleted file; no-op when the path
/// was never indexed.
pub(crate) fn remove_card_by_file(
    ctx: &CardContext,
    path: &Path,
) -> Result<Option<String>, CardOpError> {
    Ok(ctx
        .store()
        .delete_card_by_file(&path.to_string_lossy())?)
}

/// Whole-directory sync. Per-file failures are collected, not fatal; a
/// missing directory is.
pub(crate) fn bulk_sync(
    ctx: &CardContext,
    dir: Option<&Path>,
) -> Result<BulkSyncReport, CardOpError> {
    let dir = dir.unwrap_or_else(|| ctx.cards_dir());
    let paths = scan_card_files(dir)?;

    let mut report = BulkSyncReport::default();
    for path in paths {
        match sync_file_into_store(ctx, &path) {
            Ok(outcome) => {
                report.synced += 1;
                report.warnings.extend(outcome.warnings);
            }
            Err(err) => report.failures.push(SyncFailure {
                file_path: path.display().to_string(),
                error: err.to_string(),
            }),
        }
    }
    Ok(report)
}
