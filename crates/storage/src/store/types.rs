#![forbid(unsafe_code)]

use cg_core::model::{CardStatus, CodeLink, RelationSpec};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CardRow {
    pub key: String,
    pub summary: String,
    pub status: CardStatus,
    pub constraints_json: Option<String>,
    pub body: String,
    pub file_path: String,
    pub updated_at: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelationRow {
    pub id: i64,
    pub rel_type: String,
    pub src_card_key: String,
    pub dst_card_key: String,
    pub is_reverse: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeLinkRow {
    pub id: i64,
    pub card_key: String,
    pub kind: String,
    pub file: String,
    pub symbol: String,
}

/// Everything a card write carries into one store transaction.
#[derive(Clone, Debug)]
pub struct CardBundle {
    pub key: String,
    pub summary: String,
    pub status: CardStatus,
    pub constraints_json: Option<String>,
    pub body: String,
    pub file_path: String,
    pub relations: Vec<RelationSpec>,
    pub keywords: Vec<String>,
    pub tags: Vec<String>,
    pub code_links: Vec<CodeLink>,
}

/// Which auxiliary sets an update actually specified. Unspecified sets are
/// left untouched in the index.
#[derive(Clone, Copy, Debug, Default)]
pub struct SpecifiedSets {
    pub relations: bool,
    pub keywords: bool,
    pub tags: bool,
    pub code_links: bool,
}

impl SpecifiedSets {
    pub fn all() -> Self {
        Self {
            relations: true,
            keywords: true,
            tags: true,
            code_links: true,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct CardFilter {
    pub status: Option<CardStatus>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PruneResult {
    pub keywords_removed: usize,
    pub tags_removed: usize,
}
