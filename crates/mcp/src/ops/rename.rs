#![forbid(unsafe_code)]

use super::files::{move_card_file, read_card_file, write_card_file};
use super::{with_busy_retry, CardContext, CardOpError};
use crate::support::cardfile::CardFile;
use cg_core::key::CardKey;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub(crate) struct RenameCardOutput {
    pub file: CardFile,
    pub path: PathBuf,
    pub warnings: Vec<String>,
}

/// Rename runs file-first, index-second: the disk move is itself atomic and
/// reversible, so a failed index transaction rolls back by moving the file
/// home again.
pub(crate) fn rename_card(
    ctx: &CardContext,
    old_key_raw: &str,
    new_slug: &str,
) -> Result<RenameCardOutput, CardOpError> {
    let old_key = CardKey::normalize(old_key_raw)?;
    let new_key = CardKey::normalize(new_slug)?;
    let old_path = old_key.file_path(ctx.cards_dir());
    let new_path = new_key.file_path(ctx.cards_dir());
    if old_path == new_path {
        return Err(CardOpError::RenameSamePath(new_path.display().to_string()));
    }

    let (_guard_a, _guard_b) = ctx.locks().acquire_pair(old_key.as_str(), new_key.as_str());
    with_busy_retry(ctx.retry_policy(), || {
        if !old_path.exists() {
            return Err(CardOpError::NotFound(old_key.to_string()));
        }
        if new_path.exists() {
            return Err(CardOpError::AlreadyExists(new_key.to_string()));
        }

        move_card_file(&old_path, &new_path)?;

        let mut file = match read_card_file(&new_path) {
            Ok(file) => file,
            Err(err) => {
                let _ = move_card_file(&new_path, &old_path);
                return Err(err);
            }
        };
        let prior_fm_key = file.front_matter.key.clone();
        file.front_matter.key = new_key.to_string();
        if let Err(err) = write_card_file(&new_path, &file) {
            let _ = move_card_file(&new_path, &old_path);
            return Err(err);
        }

        let store_result = ctx.store().rename_card(
            old_key.as_str(),
            new_key.as_str(),
            &new_path.to_string_lossy(),
        );
        let warnings = match store_result {
            Ok(warnings) => warnings,
            Err(store_err) => {
                let _ = move_card_file(&new_path, &old_path);
                file.front_matter.key = prior_fm_key;
                let _ = write_card_file(&old_path, &file);
                return Err(store_err.into());
            }
        };

        Ok(RenameCardOutput {
            file: file.clone(),
            path: new_path.clone(),
            warnings,
        })
    })
}
