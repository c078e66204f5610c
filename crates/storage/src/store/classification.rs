#![forbid(unsafe_code)]

use super::*;
use rusqlite::{params, Transaction};

struct NamePair {
    name_table: &'static str,
    map_table: &'static str,
    id_column: &'static str,
}

const KEYWORDS: NamePair = NamePair {
    name_table: "keyword",
    map_table: "card_keyword",
    id_column: "keyword_id",
};

const TAGS: NamePair = NamePair {
    name_table: "tag",
    map_table: "card_tag",
    id_column: "tag_id",
};

impl SqliteStore {
    pub fn keywords_by_card(&self, key: &str) -> Result<Vec<String>, StoreError> {
        self.names_by_card(&KEYWORDS, key)
    }

    pub fn tags_by_card(&self, key: &str) -> Result<Vec<String>, StoreError> {
        self.names_by_card(&TAGS, key)
    }

    fn names_by_card(&self, pair: &NamePair, key: &str) -> Result<Vec<String>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT n.name FROM {map} m JOIN {names} n ON n.id = m.{id} \
             WHERE m.card_key=?1 ORDER BY n.name",
            map = pair.map_table,
            names = pair.name_table,
            id = pair.id_column,
        ))?;
        let rows = stmt.query_map(params![key], |row| row.get::<_, String>(0))?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Clears both mapping sets for a card without touching interned names.
    /// Cascade deletion covers the common path; this is the explicit form.
    pub fn delete_classification_for_card(&mut self, key: &str) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM card_keyword WHERE card_key=?1", params![key])?;
        self.conn
            .execute("DELETE FROM card_tag WHERE card_key=?1", params![key])?;
        Ok(())
    }

    /// Drops name rows no card maps to anymore. Interned names are shared,
    /// so deletion never happens implicitly on card writes.
    pub fn prune_orphan_names(&mut self) -> Result<PruneResult, StoreError> {
        let keywords_removed = self.conn.execute(
            "DELETE FROM keyword WHERE id NOT IN (SELECT keyword_id FROM card_keyword)",
            [],
        )?;
        let tags_removed = self.conn.execute(
            "DELETE FROM tag WHERE id NOT IN (SELECT tag_id FROM card_tag)",
            [],
        )?;
        Ok(PruneResult {
            keywords_removed,
            tags_removed,
        })
    }
}

pub(in crate::store) fn keywords_replace_for_card_tx(
    tx: &Transaction<'_>,
    key: &str,
    names: &[String],
) -> Result<(), StoreError> {
    replace_names_tx(tx, &KEYWORDS, key, names)
}

pub(in crate::store) fn tags_replace_for_card_tx(
    tx: &Transaction<'_>,
    key: &str,
    names: &[String],
) -> Result<(), StoreError> {
    replace_names_tx(tx, &TAGS, key, names)
}

/// Intern-then-map: the name row is inserted only when absent; mappings are
/// replaced wholesale. An empty list clears the card's mappings and interns
/// nothing.
fn replace_names_tx(
    tx: &Transaction<'_>,
    pair: &NamePair,
    key: &str,
    names: &[String],
) -> Result<(), StoreError> {
    tx.execute(
        &format!("DELETE FROM {} WHERE card_key=?1", pair.map_table),
        params![key],
    )?;
    for name in names {
        tx.execute(
            &format!(
                "INSERT OR IGNORE INTO {}(name) VALUES (?1)",
                pair.name_table
            ),
            params![name],
        )?;
        tx.execute(
            &format!(
                "INSERT OR IGNORE INTO {map}(card_key, {id}) \
                 SELECT ?1, id FROM {names} WHERE name=?2",
                map = pair.map_table,
                id = pair.id_column,
                names = pair.name_table,
            ),
            params![key, name],
        )?;
    }
    Ok(())
}
