#![forbid(unsafe_code)]

use super::files::write_card_file;
use super::{bundle_from_card_file, safe_write, with_busy_retry, CardContext, CardOpError};
use crate::support::cardfile::{CardFile, CardFrontMatter};
use cg_core::key::CardKey;
use cg_core::limits;
use cg_core::model::{CardStatus, CodeLink, RelationSpec};
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub(crate) struct CreateCardInput {
    pub slug: String,
    pub summary: String,
    pub status: Option<CardStatus>,
    pub body: Option<String>,
    pub constraints: Option<serde_json::Value>,
    pub relations: Vec<RelationSpec>,
    pub keywords: Vec<String>,
    pub tags: Vec<String>,
    pub code_links: Vec<CodeLink>,
}

#[derive(Clone, Debug)]
pub(crate) struct CreateCardOutput {
    pub file: CardFile,
    pub path: PathBuf,
    pub warnings: Vec<String>,
}

pub(crate) fn create_card(
    ctx: &CardContext,
    input: &CreateCardInput,
) -> Result<CreateCardOutput, CardOpError> {
    limits::check_card_fields(
        Some(&input.summary),
        input.body.as_deref(),
        Some(&input.relations),
        Some(&input.keywords),
        Some(&input.tags),
        Some(&input.code_links),
    )?;
    let key = CardKey::normalize(&input.slug)?;
    let path = key.file_path(ctx.cards_dir());

    let _guard = ctx.locks().acquire(key.as_str());
    with_busy_retry(ctx.retry_policy(), || {
        ctx.check_relation_types(&input.relations)?;
        if path.exists() {
            return Err(CardOpError::AlreadyExists(key.to_string()));
        }

        let file = CardFile {
            front_matter: CardFrontMatter {
                key: key.to_string(),
                summary: input.summary.clone(),
                status: input.status.unwrap_or_default(),
                tags: input.tags.clone(),
                keywords: input.keywords.clone(),
                relations: input.relations.clone(),
                code_links: input.code_links.clone(),
                constraints: input.constraints.clone(),
            },
            body: input.body.clone().unwrap_or_default(),
        };
        let bundle = bundle_from_card_file(&file, &path);

        let warnings = safe_write(
            || ctx.store().insert_card_bundle(&bundle).map_err(Into::into),
            || write_card_file(&path, &file),
            |_| {
                ctx.store().delete_card(key.as_str())?;
                Ok(())
            },
        )?;

        Ok(CreateCardOutput {
            file,
            path: path.clone(),
            warnings,
        })
    })
}
