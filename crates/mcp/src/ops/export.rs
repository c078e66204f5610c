#![forbid(unsafe_code)]

use super::files::write_card_file;
use super::{CardContext, CardOpError};
use crate::support::cardfile::{CardFile, CardFrontMatter};
use cg_core::key::CardKey;
use cg_core::model::RelationSpec;
use std::path::PathBuf;

/// DB -> file projection: regenerates the card file from index state. Only
/// the card's own forward edges appear in front matter; mirrors are derived
/// data and stay out of the file.
pub(crate) fn export_card_to_file(
    ctx: &CardContext,
    key_raw: &str,
) -> Result<(CardFile, PathBuf), CardOpError> {
    let key = CardKey::normalize(key_raw)?;

    let (row, relations, keywords, tags, code_links) = {
        let store = ctx.store();
        let Some(row) = store.card_by_key(key.as_str())? else {
            return Err(CardOpError::NotFound(key.to_string()));
        };
        let relations = store
            .relations_by_card(key.as_str())?
            .into_iter()
            .filter(|edge| !edge.is_reverse)
            .map(|edge| RelationSpec {
                rel_type: edge.rel_type,
                target: edge.dst_card_key,
            })
            .collect::<Vec<_>>();
        let keywords = store.keywords_by_card(key.as_str())?;
        let tags = store.tags_by_card(key.as_str())?;
        let code_links = store
            .code_links_by_card(key.as_str())?
            .into_iter()
            .map(|link| cg_core::model::CodeLink {
                kind: link.kind,
                file: link.file,
                symbol: link.symbol,
            })
            .collect::<Vec<_>>();
        (row, relations, keywords, tags, code_links)
    };

    let constraints = row
        .constraints_json
        .as_deref()
        .and_then(|raw| serde_json::from_str(raw).ok());

    let path = PathBuf::from(&row.file_path);
    let file = CardFile {
        front_matter: CardFrontMatter {
            key: row.key,
            summary: row.summary,
            status: row.status,
            tags,
            keywords,
            relations,
            code_links,
            constraints,
        },
        body: row.body,
    };
    write_card_file(&path, &file)?;
    Ok((file, path))
}
