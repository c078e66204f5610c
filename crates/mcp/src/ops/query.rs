#![forbid(unsafe_code)]

use super::{CardContext, CardOpError};
use cg_core::model::CardStatus;
use cg_storage::{CardFilter, CardRow, PruneResult};

pub(crate) fn list_cards(
    ctx: &CardContext,
    status: Option<CardStatus>,
) -> Result<Vec<CardRow>, CardOpError> {
    Ok(ctx.store().list_cards(&CardFilter { status })?)
}

pub(crate) fn search_cards(ctx: &CardContext, query: &str) -> Result<Vec<CardRow>, CardOpError> {
    Ok(ctx.store().search_cards(query)?)
}

/// Explicit maintenance step: classification names are interned and shared,
/// so nothing else ever deletes them.
pub(crate) fn prune_classification(ctx: &CardContext) -> Result<PruneResult, CardOpError> {
    Ok(ctx.store().prune_orphan_names()?)
}
