#![forbid(unsafe_code)]

use super::error::is_foreign_key_violation;
use super::*;
use cg_core::model::RelationSpec;
use rusqlite::{params, Row, Transaction};

fn relation_row(row: &Row<'_>) -> rusqlite::Result<RelationRow> {
    Ok(RelationRow {
        id: row.get(0)?,
        rel_type: row.get(1)?,
        src_card_key: row.get(2)?,
        dst_card_key: row.get(3)?,
        is_reverse: row.get::<_, i64>(4)? != 0,
    })
}

impl SqliteStore {
    /// All edges whose source is `key`: the card's own forward edges plus
    /// the mirrors of edges other cards declared at it. Ordered by insert id
    /// so traversal is deterministic.
    pub fn relations_by_card(&self, key: &str) -> Result<Vec<RelationRow>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, type, src_card_key, dst_card_key, is_reverse \
             FROM card_relation WHERE src_card_key=?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![key], relation_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

/// Replaces the edges owned by `key`: its forward edges and the mirror rows
/// those edges planted on their targets. Forward edges other cards point at
/// `key` with are left alone. A missing target skips that one edge (the
/// warning surfaces to the caller); any other failure aborts the transaction.
pub(in crate::store) fn relations_replace_for_card_tx(
    tx: &Transaction<'_>,
    key: &str,
    specs: &[RelationSpec],
    warnings: &mut Vec<String>,
) -> Result<(), StoreError> {
    tx.execute(
        "DELETE FROM card_relation WHERE src_card_key=?1 AND is_reverse=0",
        params![key],
    )?;
    tx.execute(
        "DELETE FROM card_relation WHERE dst_card_key=?1 AND is_reverse=1",
        params![key],
    )?;

    for spec in specs {
        let forward = tx.execute(
            "INSERT INTO card_relation(type, src_card_key, dst_card_key, is_reverse) \
             VALUES (?1, ?2, ?3, 0)",
            params![spec.rel_type, key, spec.target],
        );
        match forward {
            Ok(_) => {}
            Err(err) if is_foreign_key_violation(&err) => {
                warnings.push(format!(
                    "skipped relation {} -> {} ({}): target card not found",
                    key, spec.target, spec.rel_type
                ));
                continue;
            }
            Err(err) => return Err(err.into()),
        }
        // Mirror row. A self-referencing edge collides with its own forward
        // row on UNIQUE(type, src, dst) and aborts here.
        tx.execute(
            "INSERT INTO card_relation(type, src_card_key, dst_card_key, is_reverse) \
             VALUES (?1, ?2, ?3, 1)",
            params![spec.rel_type, spec.target, key],
        )?;
    }
    Ok(())
}

/// Forward-direction specs currently owned by `key`, for rename snapshots.
pub(in crate::store) fn forward_specs_tx(
    tx: &Transaction<'_>,
    key: &str,
) -> Result<Vec<RelationSpec>, StoreError> {
    let mut stmt = tx.prepare(
        "SELECT type, dst_card_key FROM card_relation \
         WHERE src_card_key=?1 AND is_reverse=0 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![key], |row| {
        Ok(RelationSpec {
            rel_type: row.get(0)?,
            target: row.get(1)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}
