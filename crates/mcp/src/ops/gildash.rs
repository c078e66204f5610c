#![forbid(unsafe_code)]
//! Code-link resolution against gildash, the external symbol indexer. The
//! indexer is an opaque per-context capability; everything here degrades or
//! fails typed when it is absent.

use super::{CardContext, CardOpError};
use cg_core::key::CardKey;
use cg_storage::{CardRow, CodeLinkRow};
use serde::Deserialize;
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub(crate) struct SymbolHit {
    pub name: String,
    pub file: String,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub line: Option<u32>,
}

#[derive(Clone, Debug)]
pub(crate) struct GildashError(pub String);

impl std::fmt::Display for GildashError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for GildashError {}

pub(crate) trait Gildash: Send + Sync {
    fn find_symbols(
        &self,
        name: &str,
        file: Option<&str>,
    ) -> Result<Vec<SymbolHit>, GildashError>;
}

/// Gildash binding over a pre-built JSON symbol index on disk. The indexer
/// itself runs elsewhere; this only reads what it exported.
#[derive(Debug)]
pub(crate) struct FileGildash {
    symbols: Vec<SymbolHit>,
}

impl FileGildash {
    pub(crate) fn load(path: &Path) -> Result<Self, GildashError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|err| GildashError(format!("cannot read symbol index: {err}")))?;
        let symbols: Vec<SymbolHit> = serde_json::from_str(&raw)
            .map_err(|err| GildashError(format!("symbol index is not valid JSON: {err}")))?;
        Ok(Self { symbols })
    }
}

impl Gildash for FileGildash {
    fn find_symbols(
        &self,
        name: &str,
        file: Option<&str>,
    ) -> Result<Vec<SymbolHit>, GildashError> {
        Ok(self
            .symbols
            .iter()
            .filter(|hit| hit.name == name && file.map(|f| hit.file == f).unwrap_or(true))
            .cloned()
            .collect())
    }
}

#[derive(Debug)]
pub(crate) struct ResolvedCodeLink {
    pub link: CodeLinkRow,
    pub symbol: Option<SymbolHit>,
}

#[derive(Debug)]
pub(crate) struct CodeLinkIssue {
    pub link: CodeLinkRow,
    pub issue: &'static str,
    pub detail: Option<String>,
}

pub(in crate::ops) fn resolve_one(gildash: &dyn Gildash, link: CodeLinkRow) -> ResolvedCodeLink {
    let symbol = gildash
        .find_symbols(&link.symbol, Some(&link.file))
        .ok()
        .and_then(|hits| {
            hits.into_iter()
                .find(|hit| hit.name == link.symbol && hit.file == link.file)
        });
    ResolvedCodeLink { link, symbol }
}

pub(crate) fn resolve_card_code_links(
    ctx: &CardContext,
    key_raw: &str,
) -> Result<Vec<ResolvedCodeLink>, CardOpError> {
    let Some(gildash) = ctx.gildash() else {
        return Err(CardOpError::GildashNotConfigured);
    };
    let key = CardKey::normalize(key_raw)?;
    let links = ctx.store().code_links_by_card(key.as_str())?;
    Ok(links
        .into_iter()
        .map(|link| resolve_one(gildash, link))
        .collect())
}

/// Per-link health report: `symbol-not-found` when the indexer knows the
/// file but not the symbol, `file-not-indexed` when the indexer errors for
/// that file.
pub(crate) fn validate_code_links(
    ctx: &CardContext,
    key_raw: &str,
) -> Result<Vec<CodeLinkIssue>, CardOpError> {
    let Some(gildash) = ctx.gildash() else {
        return Err(CardOpError::GildashNotConfigured);
    };
    let key = CardKey::normalize(key_raw)?;
    let links = ctx.store().code_links_by_card(key.as_str())?;

    let mut issues = Vec::new();
    for link in links {
        match gildash.find_symbols(&link.symbol, Some(&link.file)) {
            Err(err) => issues.push(CodeLinkIssue {
                link,
                issue: "file-not-indexed",
                detail: Some(err.to_string()),
            }),
            Ok(hits) => {
                let matched = hits
                    .iter()
                    .any(|hit| hit.name == link.symbol && hit.file == link.file);
                if !matched {
                    issues.push(CodeLinkIssue {
                        link,
                        issue: "symbol-not-found",
                        detail: None,
                    });
                }
            }
        }
    }
    Ok(issues)
}

/// Cards owning a link to the symbol, deduped in discovery order; rows that
/// vanished since the link was written are skipped.
pub(crate) fn find_cards_by_symbol(
    ctx: &CardContext,
    name: &str,
    file: Option<&str>,
) -> Result<Vec<CardRow>, CardOpError> {
    let store = ctx.store();
    let links = store.code_links_by_symbol(name, file)?;
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for link in links {
        if !seen.insert(link.card_key.clone()) {
            continue;
        }
        if let Some(row) = store.card_by_key(&link.card_key)? {
            out.push(row);
        }
    }
    Ok(out)
}

/// Impact query: which cards link into any of these files.
pub(crate) fn find_affected_cards(
    ctx: &CardContext,
    files: &[String],
) -> Result<Vec<CardRow>, CardOpError> {
    let store = ctx.store();
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for file in files {
        for link in store.code_links_by_file(file)? {
            if !seen.insert(link.card_key.clone()) {
                continue;
            }
            if let Some(row) = store.card_by_key(&link.card_key)? {
                out.push(row);
            }
        }
    }
    Ok(out)
}
