#![forbid(unsafe_code)]
//! Operations over a card context: the dual-source (file + index)
//! consistency engine.

mod create;
mod delete;
mod export;
mod files;
mod get;
mod gildash;
mod graph;
mod locks;
mod query;
mod rename;
mod retry;
mod safe_write;
mod sync;
mod update;
mod validate;

#[cfg(test)]
mod tests;

pub(crate) use create::{create_card, CreateCardInput};
pub(crate) use delete::delete_card;
pub(crate) use export::export_card_to_file;
pub(crate) use get::get_card;
pub(crate) use gildash::{
    find_affected_cards, find_cards_by_symbol, resolve_card_code_links, validate_code_links,
    FileGildash, Gildash, GildashError, ResolvedCodeLink, SymbolHit,
};
pub(crate) use graph::{card_context_view, relation_graph, GraphDirection, GraphVisit};
pub(crate) use locks::KeyLocks;
pub(crate) use query::{list_cards, prune_classification, search_cards};
pub(crate) use rename::rename_card;
pub(crate) use retry::{with_busy_retry, RetryPolicy};
pub(crate) use safe_write::safe_write;
pub(crate) use sync::{bulk_sync, remove_card_by_file, sync_card_from_file};
pub(crate) use update::{update_card, update_card_status, UpdateCardFields};
pub(crate) use validate::validate_cards;

use crate::support::cardfile::CardFile;
use cg_core::key::CardKeyError;
use cg_core::limits::FieldLimitError;
use cg_storage::{CardBundle, SqliteStore, StoreError};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

pub(crate) const DEFAULT_RELATION_TYPES: &[&str] = &[
    "depends-on",
    "implements",
    "refines",
    "supersedes",
    "relates-to",
];

#[derive(Debug)]
pub(crate) enum CardOpError {
    InvalidKey(CardKeyError),
    Validation(String),
    NotFound(String),
    AlreadyExists(String),
    RenameSamePath(String),
    RelationType(String),
    GildashNotConfigured,
    Compensation {
        operation: Box<CardOpError>,
        compensation: Box<CardOpError>,
    },
    Store(StoreError),
    Io(std::io::Error),
}

impl std::fmt::Display for CardOpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidKey(err) => write!(f, "invalid key: {err}"),
            Self::Validation(message) => write!(f, "card validation failed: {message}"),
            Self::NotFound(what) => write!(f, "card not found: {what}"),
            Self::AlreadyExists(key) => write!(f, "card already exists: {key}"),
            Self::RenameSamePath(path) => {
                write!(f, "rename source and destination are the same path: {path}")
            }
            Self::RelationType(rel_type) => {
                write!(f, "relation type is not allowed: {rel_type}")
            }
            Self::GildashNotConfigured => {
                write!(f, "gildash symbol indexer is not configured")
            }
            Self::Compensation {
                operation,
                compensation,
            } => write!(
                f,
                "write failed and rollback also failed; operator attention required \
                 (operation: {operation}; compensation: {compensation})"
            ),
            Self::Store(err) => write!(f, "store: {err}"),
            Self::Io(err) => write!(f, "io: {err}"),
        }
    }
}

impl std::error::Error for CardOpError {}

impl From<CardKeyError> for CardOpError {
    fn from(value: CardKeyError) -> Self {
        Self::InvalidKey(value)
    }
}

impl From<FieldLimitError> for CardOpError {
    fn from(value: FieldLimitError) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<StoreError> for CardOpError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<std::io::Error> for CardOpError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl CardOpError {
    /// Only store contention is retryable.
    pub(crate) fn is_busy(&self) -> bool {
        matches!(self, Self::Store(err) if err.is_busy())
    }
}

/// Shared state of one cardgraph instance: the cards dir, the index, the
/// per-key lock map, and the optional symbol indexer. The lock map lives and
/// dies with this value.
pub(crate) struct CardContext {
    cards_dir: PathBuf,
    store: Mutex<SqliteStore>,
    locks: KeyLocks,
    relation_types: Vec<String>,
    retry: RetryPolicy,
    gildash: Option<Box<dyn Gildash>>,
}

impl CardContext {
    pub(crate) fn open(
        cards_dir: PathBuf,
        storage_dir: &Path,
        relation_types: Option<Vec<String>>,
    ) -> Result<Self, CardOpError> {
        let store = SqliteStore::open(storage_dir)?;
        Ok(Self {
            cards_dir,
            store: Mutex::new(store),
            locks: KeyLocks::new(),
            relation_types: relation_types.unwrap_or_else(|| {
                DEFAULT_RELATION_TYPES
                    .iter()
                    .map(|item| item.to_string())
                    .collect()
            }),
            retry: RetryPolicy::default(),
            gildash: None,
        })
    }

    pub(crate) fn with_gildash(mut self, gildash: Box<dyn Gildash>) -> Self {
        self.gildash = Some(gildash);
        self
    }

    pub(crate) fn cards_dir(&self) -> &Path {
        &self.cards_dir
    }

    pub(crate) fn storage_dir(&self) -> PathBuf {
        self.store().storage_dir().to_path_buf()
    }

    pub(crate) fn relation_types(&self) -> &[String] {
        &self.relation_types
    }

    pub(crate) fn gildash(&self) -> Option<&dyn Gildash> {
        self.gildash.as_deref()
    }

    pub(crate) fn locks(&self) -> &KeyLocks {
        &self.locks
    }

    pub(crate) fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    pub(crate) fn store(&self) -> MutexGuard<'_, SqliteStore> {
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn check_relation_types(
        &self,
        specs: &[cg_core::model::RelationSpec],
    ) -> Result<(), CardOpError> {
        for spec in specs {
            if !self.relation_types.iter().any(|t| t == &spec.rel_type) {
                return Err(CardOpError::RelationType(spec.rel_type.clone()));
            }
        }
        Ok(())
    }
}

/// Projects a parsed card file into the row set one store transaction
/// writes.
pub(crate) fn bundle_from_card_file(file: &CardFile, path: &Path) -> CardBundle {
    let fm = &file.front_matter;
    CardBundle {
        key: fm.key.clone(),
        summary: fm.summary.clone(),
        status: fm.status,
        constraints_json: fm
            .constraints
            .as_ref()
            .and_then(|value| serde_json::to_string(value).ok()),
        body: file.body.clone(),
        file_path: path.to_string_lossy().to_string(),
        relations: fm.relations.clone(),
        keywords: fm.keywords.clone(),
        tags: fm.tags.clone(),
        code_links: fm.code_links.clone(),
    }
}
