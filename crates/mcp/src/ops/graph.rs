#![forbid(unsafe_code)]

use super::gildash::ResolvedCodeLink;
use super::{CardContext, CardOpError};
use cg_core::key::CardKey;
use cg_storage::CardRow;
use std::collections::{HashSet, VecDeque};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum GraphDirection {
    Forward,
    Backward,
    Both,
}

impl GraphDirection {
    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value {
            "forward" => Some(Self::Forward),
            "backward" => Some(Self::Backward),
            "both" => Some(Self::Both),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct GraphVisit {
    pub key: String,
    pub depth: usize,
    pub relation_type: String,
    pub direction: &'static str,
}

/// Breadth-first walk over relation edges. Every reached card is emitted at
/// most once, tagged with the depth and edge that first discovered it; the
/// root itself is not emitted. Expansion order follows the store's by-id
/// edge order, so an unchanged index walks identically every time.
pub(crate) fn relation_graph(
    ctx: &CardContext,
    key_raw: &str,
    max_depth: Option<usize>,
    direction: GraphDirection,
) -> Result<Vec<GraphVisit>, CardOpError> {
    let key = CardKey::normalize(key_raw)?;
    let store = ctx.store();

    if !store.card_exists(key.as_str())? {
        return Ok(Vec::new());
    }
    if max_depth == Some(0) {
        return Ok(Vec::new());
    }

    let mut visited = HashSet::new();
    visited.insert(key.to_string());
    let mut queue = VecDeque::new();
    queue.push_back((key.into_string(), 0usize));
    let mut out = Vec::new();

    while let Some((current, depth)) = queue.pop_front() {
        for edge in store.relations_by_card(&current)? {
            let keep = match direction {
                GraphDirection::Forward => !edge.is_reverse,
                GraphDirection::Backward => edge.is_reverse,
                GraphDirection::Both => true,
            };
            if !keep {
                continue;
            }
            let next = edge.dst_card_key;
            if visited.contains(&next) {
                continue;
            }
            // Orphan edge: the target row vanished under us.
            if !store.card_exists(&next)? {
                continue;
            }
            visited.insert(next.clone());
            let next_depth = depth + 1;
            out.push(GraphVisit {
                key: next.clone(),
                depth: next_depth,
                relation_type: edge.rel_type,
                direction: if edge.is_reverse { "backward" } else { "forward" },
            });
            if max_depth.map(|limit| next_depth < limit).unwrap_or(true) {
                queue.push_back((next, next_depth));
            }
        }
    }
    Ok(out)
}

#[derive(Debug)]
pub(crate) struct CardContextView {
    pub card: CardRow,
    pub code_links: Vec<ResolvedCodeLink>,
    pub upstream: Vec<CardRow>,
    pub downstream: Vec<CardRow>,
}

/// One-hop neighborhood plus resolved code links. Without a configured
/// symbol indexer the links section degrades to empty instead of failing.
pub(crate) fn card_context_view(
    ctx: &CardContext,
    key_raw: &str,
) -> Result<CardContextView, CardOpError> {
    let key = CardKey::normalize(key_raw)?;
    let store = ctx.store();

    let Some(card) = store.card_by_key(key.as_str())? else {
        return Err(CardOpError::NotFound(key.to_string()));
    };

    let mut upstream = Vec::new();
    let mut downstream = Vec::new();
    for edge in store.relations_by_card(key.as_str())? {
        let Some(row) = store.card_by_key(&edge.dst_card_key)? else {
            continue;
        };
        if edge.is_reverse {
            upstream.push(row);
        } else {
            downstream.push(row);
        }
    }

    let code_links = match ctx.gildash() {
        None => Vec::new(),
        Some(gildash) => {
            let links = store.code_links_by_card(key.as_str())?;
            links
                .into_iter()
                .map(|link| super::gildash::resolve_one(gildash, link))
                .collect()
        }
    };

    Ok(CardContextView {
        card,
        code_links,
        upstream,
        downstream,
    })
}
