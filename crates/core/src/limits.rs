#![forbid(unsafe_code)]

use crate::model::{CodeLink, RelationSpec};

pub const MAX_SUMMARY_CHARS: usize = 500;
pub const MAX_BODY_CHARS: usize = 100_000;
pub const MAX_LIST_ITEMS: usize = 100;
pub const MAX_CLASSIFICATION_NAME_CHARS: usize = 100;
pub const MAX_RELATION_TARGET_CHARS: usize = 200;
pub const MAX_CODE_LINK_SYMBOL_CHARS: usize = 200;
pub const MAX_CODE_LINK_FILE_CHARS: usize = 500;

/// First violated ceiling, in field order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldLimitError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for FieldLimitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for FieldLimitError {}

fn too_long(field: &str, max: usize) -> FieldLimitError {
    FieldLimitError {
        field: field.to_string(),
        message: format!("exceeds {max} characters"),
    }
}

fn too_many(field: &str, max: usize) -> FieldLimitError {
    FieldLimitError {
        field: field.to_string(),
        message: format!("exceeds {max} items"),
    }
}

fn check_required(field: &str, value: &str) -> Result<(), FieldLimitError> {
    if value.trim().is_empty() {
        return Err(FieldLimitError {
            field: field.to_string(),
            message: "must not be empty".to_string(),
        });
    }
    Ok(())
}

pub fn check_summary(summary: &str) -> Result<(), FieldLimitError> {
    check_required("summary", summary)?;
    if summary.chars().count() > MAX_SUMMARY_CHARS {
        return Err(too_long("summary", MAX_SUMMARY_CHARS));
    }
    Ok(())
}

pub fn check_body(body: &str) -> Result<(), FieldLimitError> {
    if body.chars().count() > MAX_BODY_CHARS {
        return Err(too_long("body", MAX_BODY_CHARS));
    }
    Ok(())
}

pub fn check_relations(relations: &[RelationSpec]) -> Result<(), FieldLimitError> {
    if relations.len() > MAX_LIST_ITEMS {
        return Err(too_many("relations", MAX_LIST_ITEMS));
    }
    for (idx, spec) in relations.iter().enumerate() {
        let field = format!("relations[{idx}]");
        check_required(&field, &spec.rel_type)?;
        check_required(&field, &spec.target)?;
        if spec.target.chars().count() > MAX_RELATION_TARGET_CHARS {
            return Err(too_long(&field, MAX_RELATION_TARGET_CHARS));
        }
    }
    Ok(())
}

fn check_names(field: &str, names: &[String]) -> Result<(), FieldLimitError> {
    if names.len() > MAX_LIST_ITEMS {
        return Err(too_many(field, MAX_LIST_ITEMS));
    }
    for (idx, name) in names.iter().enumerate() {
        let item = format!("{field}[{idx}]");
        check_required(&item, name)?;
        if name.chars().count() > MAX_CLASSIFICATION_NAME_CHARS {
            return Err(too_long(&item, MAX_CLASSIFICATION_NAME_CHARS));
        }
    }
    Ok(())
}

pub fn check_keywords(keywords: &[String]) -> Result<(), FieldLimitError> {
    check_names("keywords", keywords)
}

pub fn check_tags(tags: &[String]) -> Result<(), FieldLimitError> {
    check_names("tags", tags)
}

pub fn check_code_links(links: &[CodeLink]) -> Result<(), FieldLimitError> {
    if links.len() > MAX_LIST_ITEMS {
        return Err(too_many("codeLinks", MAX_LIST_ITEMS));
    }
    for (idx, link) in links.iter().enumerate() {
        let field = format!("codeLinks[{idx}]");
        check_required(&field, &link.kind)?;
        check_required(&field, &link.file)?;
        check_required(&field, &link.symbol)?;
        if link.symbol.chars().count() > MAX_CODE_LINK_SYMBOL_CHARS {
            return Err(too_long(&field, MAX_CODE_LINK_SYMBOL_CHARS));
        }
        if link.file.chars().count() > MAX_CODE_LINK_FILE_CHARS {
            return Err(too_long(&field, MAX_CODE_LINK_FILE_CHARS));
        }
    }
    Ok(())
}

/// Validates whichever fields an operation carries, in field order:
/// summary, body, relations, keywords, tags, code links.
pub fn check_card_fields(
    summary: Option<&str>,
    body: Option<&str>,
    relations: Option<&[RelationSpec]>,
    keywords: Option<&[String]>,
    tags: Option<&[String]>,
    code_links: Option<&[CodeLink]>,
) -> Result<(), FieldLimitError> {
    if let Some(summary) = summary {
        check_summary(summary)?;
    }
    if let Some(body) = body {
        check_body(body)?;
    }
    if let Some(relations) = relations {
        check_relations(relations)?;
    }
    if let Some(keywords) = keywords {
        check_keywords(keywords)?;
    }
    if let Some(tags) = tags {
        check_tags(tags)?;
    }
    if let Some(code_links) = code_links {
        check_code_links(code_links)?;
    }
    Ok(())
}
