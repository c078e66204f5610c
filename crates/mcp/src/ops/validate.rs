#![forbid(unsafe_code)]

use super::files::scan_card_files;
use super::{CardContext, CardOpError};
use cg_core::key::CardKey;
use std::collections::BTreeSet;
use std::path::Path;

/// Read-only reconciliation view of filesystem vs index.
#[derive(Clone, Debug, Default)]
pub(crate) struct ValidateReport {
    pub stale_db_rows: Vec<StaleRow>,
    pub orphan_files: Vec<String>,
    pub key_mismatches: Vec<KeyMismatch>,
}

#[derive(Clone, Debug)]
pub(crate) struct StaleRow {
    pub key: String,
    pub file_path: String,
}

#[derive(Clone, Debug)]
pub(crate) struct KeyMismatch {
    pub key: String,
    pub file_path: String,
    pub derived_key: String,
}

pub(crate) fn validate_cards(
    ctx: &CardContext,
    dir: Option<&Path>,
) -> Result<ValidateReport, CardOpError> {
    let dir = dir.unwrap_or_else(|| ctx.cards_dir());
    let rows = ctx.store().list_file_paths()?;
    let files = scan_card_files(dir)?;

    let indexed_paths = rows
        .iter()
        .map(|(_, file_path)| file_path.clone())
        .collect::<BTreeSet<_>>();

    let mut report = ValidateReport::default();

    for (key, file_path) in &rows {
        if !Path::new(file_path).exists() {
            report.stale_db_rows.push(StaleRow {
                key: key.clone(),
                file_path: file_path.clone(),
            });
        }
        if let Some(derived) = derived_key(dir, Path::new(file_path)) {
            if &derived != key {
                report.key_mismatches.push(KeyMismatch {
                    key: key.clone(),
                    file_path: file_path.clone(),
                    derived_key: derived,
                });
            }
        }
    }

    for path in files {
        let text = path.to_string_lossy().to_string();
        if !indexed_paths.contains(&text) {
            report.orphan_files.push(text);
        }
    }

    Ok(report)
}

/// Filename-derived key: the path relative to the scan dir minus the card
/// suffix. Paths outside the dir fall back to their bare file stem.
fn derived_key(dir: &Path, file_path: &Path) -> Option<String> {
    let relative = file_path.strip_prefix(dir).unwrap_or(file_path);
    CardKey::stem_from_relative_path(relative)
}
