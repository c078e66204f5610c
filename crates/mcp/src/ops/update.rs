#![forbid(unsafe_code)]

use super::files::{read_card_file, write_card_file};
use super::sync::sync_file_into_store;
use super::{bundle_from_card_file, safe_write, with_busy_retry, CardContext, CardOpError};
use crate::support::cardfile::CardFile;
use cg_core::key::CardKey;
use cg_core::limits;
use cg_core::model::{CardStatus, CodeLink, RelationSpec};
use cg_storage::SpecifiedSets;
use std::path::PathBuf;

/// Field patch semantics: `None` keeps the prior value; an empty list (the
/// JSON boundary maps `null` to it) deletes the optional field; for
/// `constraints` the outer option is presence and the inner is null-vs-set.
#[derive(Clone, Debug, Default)]
pub(crate) struct UpdateCardFields {
    pub summary: Option<String>,
    pub status: Option<CardStatus>,
    pub body: Option<String>,
    pub constraints: Option<Option<serde_json::Value>>,
    pub relations: Option<Vec<RelationSpec>>,
    pub keywords: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub code_links: Option<Vec<CodeLink>>,
}

#[derive(Clone, Debug)]
pub(crate) struct UpdateCardOutput {
    pub file: CardFile,
    pub path: PathBuf,
    pub warnings: Vec<String>,
}

pub(crate) fn update_card(
    ctx: &CardContext,
    key_raw: &str,
    fields: &UpdateCardFields,
) -> Result<UpdateCardOutput, CardOpError> {
    limits::check_card_fields(
        fields.summary.as_deref(),
        fields.body.as_deref(),
        fields.relations.as_deref(),
        fields.keywords.as_deref(),
        fields.tags.as_deref(),
        fields.code_links.as_deref(),
    )?;
    let key = CardKey::normalize(key_raw)?;
    let path = key.file_path(ctx.cards_dir());

    let _guard = ctx.locks().acquire(key.as_str());
    with_busy_retry(ctx.retry_policy(), || {
        let prior = read_card_file(&path)?;
        if prior.front_matter.key != key.as_str() {
            // A file whose header names another card is not this card.
            return Err(CardOpError::NotFound(key.to_string()));
        }
        if let Some(relations) = &fields.relations {
            ctx.check_relation_types(relations)?;
        }

        let mut file = prior;
        let fm = &mut file.front_matter;
        if let Some(summary) = &fields.summary {
            fm.summary = summary.clone();
        }
        if let Some(status) = fields.status {
            fm.status = status;
        }
        if let Some(constraints) = &fields.constraints {
            fm.constraints = constraints.clone();
        }
        if let Some(relations) = &fields.relations {
            fm.relations = relations.clone();
        }
        if let Some(keywords) = &fields.keywords {
            fm.keywords = keywords.clone();
        }
        if let Some(tags) = &fields.tags {
            fm.tags = tags.clone();
        }
        if let Some(code_links) = &fields.code_links {
            fm.code_links = code_links.clone();
        }
        if let Some(body) = &fields.body {
            file.body = body.clone();
        }

        let bundle = bundle_from_card_file(&file, &path);
        let specified = SpecifiedSets {
            relations: fields.relations.is_some(),
            keywords: fields.keywords.is_some(),
            tags: fields.tags.is_some(),
            code_links: fields.code_links.is_some(),
        };

        let warnings = safe_write(
            || {
                ctx.store()
                    .apply_card_update(&bundle, specified)
                    .map_err(Into::into)
            },
            || write_card_file(&path, &file),
            // The file still holds the prior state, so replaying it into the
            // index is a full rollback.
            |_| sync_file_into_store(ctx, &path).map(|_| ()),
        )?;

        Ok(UpdateCardOutput {
            file: file.clone(),
            path: path.clone(),
            warnings,
        })
    })
}

/// Typed status-only entry point; transition rules, if they ever arrive,
/// belong here rather than in the repository.
pub(crate) fn update_card_status(
    ctx: &CardContext,
    key_raw: &str,
    status: CardStatus,
) -> Result<UpdateCardOutput, CardOpError> {
    let key = CardKey::normalize(key_raw)?;
    let path = key.file_path(ctx.cards_dir());

    let _guard = ctx.locks().acquire(key.as_str());
    with_busy_retry(ctx.retry_policy(), || {
        let mut file = read_card_file(&path)?;
        if file.front_matter.key != key.as_str() {
            return Err(CardOpError::NotFound(key.to_string()));
        }
        file.front_matter.status = status;

        safe_write(
            || {
                ctx.store()
                    .update_card_status(key.as_str(), status)
                    .map_err(Into::into)
            },
            || write_card_file(&path, &file),
            |_| sync_file_into_store(ctx, &path).map(|_| ()),
        )?;

        Ok(UpdateCardOutput {
            file: file.clone(),
            path: path.clone(),
            warnings: Vec::new(),
        })
    })
}
