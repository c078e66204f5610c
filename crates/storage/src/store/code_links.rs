#![forbid(unsafe_code)]

use super::error::is_foreign_key_violation;
use super::*;
use cg_core::model::CodeLink;
use rusqlite::{params, Row, Transaction};

fn code_link_row(row: &Row<'_>) -> rusqlite::Result<CodeLinkRow> {
    Ok(CodeLinkRow {
        id: row.get(0)?,
        card_key: row.get(1)?,
        kind: row.get(2)?,
        file: row.get(3)?,
        symbol: row.get(4)?,
    })
}

const LINK_COLUMNS: &str = "id, card_key, kind, file, symbol";

impl SqliteStore {
    pub fn code_links_by_card(&self, key: &str) -> Result<Vec<CodeLinkRow>, StoreError> {
        self.query_links(
            &format!("SELECT {LINK_COLUMNS} FROM code_link WHERE card_key=?1 ORDER BY id"),
            params![key],
        )
    }

    pub fn code_links_by_symbol(
        &self,
        symbol: &str,
        file: Option<&str>,
    ) -> Result<Vec<CodeLinkRow>, StoreError> {
        match file {
            Some(file) => self.query_links(
                &format!(
                    "SELECT {LINK_COLUMNS} FROM code_link \
                     WHERE symbol=?1 AND file=?2 ORDER BY id"
                ),
                params![symbol, file],
            ),
            None => self.query_links(
                &format!("SELECT {LINK_COLUMNS} FROM code_link WHERE symbol=?1 ORDER BY id"),
                params![symbol],
            ),
        }
    }

    pub fn code_links_by_file(&self, file: &str) -> Result<Vec<CodeLinkRow>, StoreError> {
        self.query_links(
            &format!("SELECT {LINK_COLUMNS} FROM code_link WHERE file=?1 ORDER BY id"),
            params![file],
        )
    }

    pub fn delete_code_links_for_card(&mut self, key: &str) -> Result<usize, StoreError> {
        Ok(self
            .conn
            .execute("DELETE FROM code_link WHERE card_key=?1", params![key])?)
    }

    fn query_links(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<CodeLinkRow>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, code_link_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

pub(in crate::store) fn code_links_replace_for_card_tx(
    tx: &Transaction<'_>,
    key: &str,
    links: &[CodeLink],
    warnings: &mut Vec<String>,
) -> Result<(), StoreError> {
    tx.execute("DELETE FROM code_link WHERE card_key=?1", params![key])?;
    for link in links {
        let inserted = tx.execute(
            "INSERT INTO code_link(card_key, kind, file, symbol) VALUES (?1, ?2, ?3, ?4)",
            params![key, link.kind, link.file, link.symbol],
        );
        match inserted {
            Ok(_) => {}
            Err(err) if is_foreign_key_violation(&err) => {
                warnings.push(format!(
                    "skipped code link {}:{} ({}): card row not found",
                    link.file, link.symbol, link.kind
                ));
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}
