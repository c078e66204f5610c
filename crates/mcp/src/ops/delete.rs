#![forbid(unsafe_code)]

use super::files::remove_card_file;
use super::sync::sync_file_into_store;
use super::{safe_write, with_busy_retry, CardContext, CardOpError};
use cg_core::key::CardKey;

pub(crate) fn delete_card(ctx: &CardContext, key_raw: &str) -> Result<(), CardOpError> {
    let key = CardKey::normalize(key_raw)?;
    let path = key.file_path(ctx.cards_dir());

    let _guard = ctx.locks().acquire(key.as_str());
    with_busy_retry(ctx.retry_policy(), || {
        if !path.exists() {
            return Err(CardOpError::NotFound(key.to_string()));
        }

        safe_write(
            || {
                // A row may be missing when the index lags the file; the file
                // removal still has to happen, so this is not an error.
                ctx.store().delete_card(key.as_str())?;
                Ok(())
            },
            || remove_card_file(&path).map(|_| ()),
            // The file survived the failed removal, so it can repopulate the
            // index.
            |_| sync_file_into_store(ctx, &path).map(|_| ()),
        )
    })
}
