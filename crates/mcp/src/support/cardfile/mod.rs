#![forbid(unsafe_code)]
//! Card file codec: `---` delimited YAML front matter over a Markdown body.

mod parse;
mod render;


pub(crate) use parse::parse;
pub(crate) use render::render;

use cg_core::model::{CardStatus, CodeLink, RelationSpec};
use serde::{Deserialize, Serialize};

pub(crate) const DELIMITER: &str = "---";
pub(crate) const MAX_FILE_BYTES: usize = 1_048_576;

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct CardFile {
    pub front_matter: CardFrontMatter,
    pub body: String,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct CardFrontMatter {
    pub key: String,
    pub summary: String,
    pub status: CardStatus,
    pub tags: Vec<String>,
    pub keywords: Vec<String>,
    pub relations: Vec<RelationSpec>,
    pub code_links: Vec<CodeLink>,
    pub constraints: Option<serde_json::Value>,
}

/// Malformed card file: shape, YAML, or field-level violations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct CardFileError(pub String);

impl std::fmt::Display for CardFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for CardFileError {}

/// Serde view of the YAML header. Field names are the on-disk spelling.
#[derive(Debug, Deserialize, Serialize)]
pub(in crate::support::cardfile) struct FrontMatterYaml {
    pub key: String,
    pub summary: String,
    pub status: CardStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relations: Vec<RelationSpec>,
    #[serde(
        default,
        rename = "codeLinks",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub code_links: Vec<CodeLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<serde_yaml::Value>,
}
