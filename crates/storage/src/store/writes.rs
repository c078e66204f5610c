#![forbid(unsafe_code)]

use super::cards::{insert_card_row_tx, upsert_card_row_tx};
use super::classification::{keywords_replace_for_card_tx, tags_replace_for_card_tx};
use super::code_links::code_links_replace_for_card_tx;
use super::relations::{forward_specs_tx, relations_replace_for_card_tx};
use super::*;
use rusqlite::{params, OptionalExtension, Transaction};

impl SqliteStore {
    /// Card creation: card row plus every auxiliary set in one transaction.
    /// Returns the per-edge skip warnings.
    pub fn insert_card_bundle(&mut self, bundle: &CardBundle) -> Result<Vec<String>, StoreError> {
        let mut warnings = Vec::new();
        let tx = self.conn.transaction()?;
        insert_card_row_tx(&tx, bundle)?;
        replace_aux_tx(&tx, bundle, SpecifiedSets::all(), &mut warnings)?;
        tx.commit()?;
        Ok(warnings)
    }

    /// Update: upsert the row, then replace only the sets the caller
    /// actually specified.
    pub fn apply_card_update(
        &mut self,
        bundle: &CardBundle,
        specified: SpecifiedSets,
    ) -> Result<Vec<String>, StoreError> {
        let mut warnings = Vec::new();
        let tx = self.conn.transaction()?;
        upsert_card_row_tx(&tx, bundle)?;
        replace_aux_tx(&tx, bundle, specified, &mut warnings)?;
        tx.commit()?;
        Ok(warnings)
    }

    /// File-to-index sync: upsert plus full auxiliary replacement, so a
    /// repeat call with the same file leaves the index unchanged.
    pub fn sync_card(&mut self, bundle: &CardBundle) -> Result<Vec<String>, StoreError> {
        self.apply_card_update(bundle, SpecifiedSets::all())
    }

    /// Rename: snapshot what the old card owns, drop the row (cascade takes
    /// the rest), insert the new row, and replant the snapshot under the new
    /// key.
    pub fn rename_card(
        &mut self,
        old_key: &str,
        new_key: &str,
        new_file_path: &str,
    ) -> Result<Vec<String>, StoreError> {
        let mut warnings = Vec::new();
        let tx = self.conn.transaction()?;

        let old = tx
            .query_row(
                "SELECT summary, status, constraints_json, body FROM card WHERE key=?1",
                params![old_key],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;
        let Some((summary, status_raw, constraints_json, body)) = old else {
            return Err(StoreError::UnknownKey(old_key.to_string()));
        };
        let Some(status) = cg_core::model::CardStatus::parse(&status_raw) else {
            return Err(StoreError::InvalidInput("unknown card status"));
        };

        let relations = forward_specs_tx(&tx, old_key)?;
        let keywords = names_snapshot_tx(&tx, "card_keyword", "keyword", "keyword_id", old_key)?;
        let tags = names_snapshot_tx(&tx, "card_tag", "tag", "tag_id", old_key)?;
        let code_links = code_links_snapshot_tx(&tx, old_key)?;

        tx.execute("DELETE FROM card WHERE key=?1", params![old_key])?;

        let bundle = CardBundle {
            key: new_key.to_string(),
            summary,
            status,
            constraints_json,
            body,
            file_path: new_file_path.to_string(),
            relations,
            keywords,
            tags,
            code_links,
        };
        insert_card_row_tx(&tx, &bundle)?;
        replace_aux_tx(&tx, &bundle, SpecifiedSets::all(), &mut warnings)?;

        tx.commit()?;
        Ok(warnings)
    }

    /// Index-side removal keyed by file path; absent paths are a no-op.
    pub fn delete_card_by_file(&mut self, file_path: &str) -> Result<Option<String>, StoreError> {
        let key = self
            .conn
            .query_row(
                "SELECT key FROM card WHERE file_path=?1",
                params![file_path],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        if let Some(ref key) = key {
            self.conn
                .execute("DELETE FROM card WHERE key=?1", params![key])?;
        }
        Ok(key)
    }
}

fn replace_aux_tx(
    tx: &Transaction<'_>,
    bundle: &CardBundle,
    specified: SpecifiedSets,
    warnings: &mut Vec<String>,
) -> Result<(), StoreError> {
    if specified.relations {
        relations_replace_for_card_tx(tx, &bundle.key, &bundle.relations, warnings)?;
    }
    if specified.keywords {
        keywords_replace_for_card_tx(tx, &bundle.key, &bundle.keywords)?;
    }
    if specified.tags {
        tags_replace_for_card_tx(tx, &bundle.key, &bundle.tags)?;
    }
    if specified.code_links {
        code_links_replace_for_card_tx(tx, &bundle.key, &bundle.code_links, warnings)?;
    }
    Ok(())
}

fn names_snapshot_tx(
    tx: &Transaction<'_>,
    map_table: &str,
    name_table: &str,
    id_column: &str,
    key: &str,
) -> Result<Vec<String>, StoreError> {
    let mut stmt = tx.prepare(&format!(
        "SELECT n.name FROM {map_table} m JOIN {name_table} n ON n.id = m.{id_column} \
         WHERE m.card_key=?1 ORDER BY n.name"
    ))?;
    let rows = stmt.query_map(params![key], |row| row.get::<_, String>(0))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

fn code_links_snapshot_tx(
    tx: &Transaction<'_>,
    key: &str,
) -> Result<Vec<cg_core::model::CodeLink>, StoreError> {
    let mut stmt = tx.prepare(
        "SELECT kind, file, symbol FROM code_link WHERE card_key=?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![key], |row| {
        Ok(cg_core::model::CodeLink {
            kind: row.get(0)?,
            file: row.get(1)?,
            symbol: row.get(2)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}
