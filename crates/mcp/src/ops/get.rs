#![forbid(unsafe_code)]

use super::files::read_card_file;
use super::{CardContext, CardOpError};
use crate::support::cardfile::CardFile;
use cg_core::key::CardKey;
use std::path::PathBuf;

/// Reads go through the file, not the index: the file is the source of
/// truth a human may have edited since the last sync.
pub(crate) fn get_card(
    ctx: &CardContext,
    key_raw: &str,
) -> Result<(CardFile, PathBuf), CardOpError> {
    let key = CardKey::normalize(key_raw)?;
    let path = key.file_path(ctx.cards_dir());
    let file = read_card_file(&path)?;
    Ok((file, path))
}
