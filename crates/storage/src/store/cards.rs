#![forbid(unsafe_code)]

use super::*;
use cg_core::model::CardStatus;
use rusqlite::{params, OptionalExtension, Row, Transaction};

const CARD_COLUMNS: &str =
    "key, summary, status, constraints_json, body, file_path, updated_at";

pub(in crate::store) fn card_row(row: &Row<'_>) -> rusqlite::Result<CardRow> {
    let status_raw: String = row.get(2)?;
    let status = CardStatus::parse(&status_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            format!("unknown card status: {status_raw}").into(),
        )
    })?;
    Ok(CardRow {
        key: row.get(0)?,
        summary: row.get(1)?,
        status,
        constraints_json: row.get(3)?,
        body: row.get(4)?,
        file_path: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

impl SqliteStore {
    pub fn card_by_key(&self, key: &str) -> Result<Option<CardRow>, StoreError> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {CARD_COLUMNS} FROM card WHERE key=?1"),
                params![key],
                card_row,
            )
            .optional()?)
    }

    pub fn card_by_file_path(&self, file_path: &str) -> Result<Option<CardRow>, StoreError> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {CARD_COLUMNS} FROM card WHERE file_path=?1"),
                params![file_path],
                card_row,
            )
            .optional()?)
    }

    pub fn card_exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self
            .conn
            .query_row("SELECT 1 FROM card WHERE key=?1", params![key], |_| Ok(()))
            .optional()?
            .is_some())
    }

    pub fn list_cards(&self, filter: &CardFilter) -> Result<Vec<CardRow>, StoreError> {
        let mut out = Vec::new();
        match filter.status {
            Some(status) => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {CARD_COLUMNS} FROM card WHERE status=?1 ORDER BY key"
                ))?;
                let rows = stmt.query_map(params![status.as_str()], card_row)?;
                for row in rows {
                    out.push(row?);
                }
            }
            None => {
                let mut stmt = self
                    .conn
                    .prepare(&format!("SELECT {CARD_COLUMNS} FROM card ORDER BY key"))?;
                let rows = stmt.query_map([], card_row)?;
                for row in rows {
                    out.push(row?);
                }
            }
        }
        Ok(out)
    }

    /// Full-text lookup over key/summary/body. Empty queries return nothing
    /// rather than matching everything.
    pub fn search_cards(&self, query: &str) -> Result<Vec<CardRow>, StoreError> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let mut stmt = self.conn.prepare(
            "SELECT c.key, c.summary, c.status, c.constraints_json, c.body, c.file_path, c.updated_at \
             FROM card_fts f JOIN card c ON c.rowid = f.rowid \
             WHERE card_fts MATCH ?1 ORDER BY rank",
        )?;
        let rows = stmt.query_map(params![query], card_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn list_file_paths(&self) -> Result<Vec<(String, String)>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, file_path FROM card ORDER BY key")?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn delete_card(&mut self, key: &str) -> Result<bool, StoreError> {
        let deleted = self
            .conn
            .execute("DELETE FROM card WHERE key=?1", params![key])?;
        Ok(deleted > 0)
    }

    pub fn update_card_status(
        &mut self,
        key: &str,
        status: CardStatus,
    ) -> Result<(), StoreError> {
        let updated = self.conn.execute(
            "UPDATE card SET status=?2, updated_at=?3 WHERE key=?1",
            params![key, status.as_str(), now_rfc3339()],
        )?;
        if updated == 0 {
            return Err(StoreError::UnknownKey(key.to_string()));
        }
        Ok(())
    }
}

pub(in crate::store) fn upsert_card_row_tx(
    tx: &Transaction<'_>,
    bundle: &CardBundle,
) -> Result<(), StoreError> {
    tx.execute(
        r#"
        INSERT INTO card(key, summary, status, constraints_json, body, file_path, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ON CONFLICT(key) DO UPDATE SET
          summary=excluded.summary,
          status=excluded.status,
          constraints_json=excluded.constraints_json,
          body=excluded.body,
          file_path=excluded.file_path,
          updated_at=excluded.updated_at
        "#,
        params![
            bundle.key,
            bundle.summary,
            bundle.status.as_str(),
            bundle.constraints_json,
            bundle.body,
            bundle.file_path,
            now_rfc3339(),
        ],
    )?;
    Ok(())
}

pub(in crate::store) fn insert_card_row_tx(
    tx: &Transaction<'_>,
    bundle: &CardBundle,
) -> Result<(), StoreError> {
    tx.execute(
        "INSERT INTO card(key, summary, status, constraints_json, body, file_path, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            bundle.key,
            bundle.summary,
            bundle.status.as_str(),
            bundle.constraints_json,
            bundle.body,
            bundle.file_path,
            now_rfc3339(),
        ],
    )?;
    Ok(())
}
