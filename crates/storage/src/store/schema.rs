#![forbid(unsafe_code)]

use super::StoreError;
use rusqlite::{params, Connection};

struct Migration {
    version: i64,
    sql: &'static str,
}

/// Forward-only, serially applied. `PRAGMA user_version` records the last
/// applied step; a fresh database walks the whole list, an existing one
/// only the tail.
const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: SCHEMA_V1,
}];

pub(in crate::store) fn migrate_sqlite_schema(conn: &Connection) -> Result<(), StoreError> {
    let current: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    let mut applied = current;
    for migration in MIGRATIONS {
        if migration.version <= applied {
            continue;
        }
        conn.execute_batch(migration.sql)?;
        conn.pragma_update(None, "user_version", migration.version)?;
        applied = migration.version;
    }

    conn.execute(
        "INSERT OR REPLACE INTO meta(key, value) VALUES ('schema_version', ?1)",
        params![applied.to_string()],
    )?;
    Ok(())
}

pub(in crate::store) fn schema_version(conn: &Connection) -> Result<i64, StoreError> {
    Ok(conn.query_row("PRAGMA user_version", [], |row| row.get(0))?)
}

const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS meta (
  key TEXT PRIMARY KEY,
  value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS card (
  key TEXT PRIMARY KEY,
  summary TEXT NOT NULL,
  status TEXT NOT NULL,
  constraints_json TEXT,
  body TEXT NOT NULL DEFAULT '',
  file_path TEXT NOT NULL UNIQUE,
  updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS card_relation (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  type TEXT NOT NULL,
  src_card_key TEXT NOT NULL
    REFERENCES card(key) ON DELETE CASCADE ON UPDATE CASCADE,
  dst_card_key TEXT NOT NULL
    REFERENCES card(key) ON DELETE CASCADE ON UPDATE CASCADE,
  is_reverse INTEGER NOT NULL DEFAULT 0,
  UNIQUE (type, src_card_key, dst_card_key)
);
CREATE INDEX IF NOT EXISTS idx_card_relation_src ON card_relation(src_card_key);
CREATE INDEX IF NOT EXISTS idx_card_relation_dst ON card_relation(dst_card_key);

CREATE TABLE IF NOT EXISTS keyword (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  name TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS card_keyword (
  card_key TEXT NOT NULL
    REFERENCES card(key) ON DELETE CASCADE ON UPDATE CASCADE,
  keyword_id INTEGER NOT NULL
    REFERENCES keyword(id) ON DELETE CASCADE,
  PRIMARY KEY (card_key, keyword_id)
);

CREATE TABLE IF NOT EXISTS tag (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  name TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS card_tag (
  card_key TEXT NOT NULL
    REFERENCES card(key) ON DELETE CASCADE ON UPDATE CASCADE,
  tag_id INTEGER NOT NULL
    REFERENCES tag(id) ON DELETE CASCADE,
  PRIMARY KEY (card_key, tag_id)
);

CREATE TABLE IF NOT EXISTS code_link (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  card_key TEXT NOT NULL
    REFERENCES card(key) ON DELETE CASCADE ON UPDATE CASCADE,
  kind TEXT NOT NULL,
  file TEXT NOT NULL,
  symbol TEXT NOT NULL,
  UNIQUE (card_key, kind, file, symbol)
);
CREATE INDEX IF NOT EXISTS idx_code_link_card ON code_link(card_key);
CREATE INDEX IF NOT EXISTS idx_code_link_symbol ON code_link(symbol);
CREATE INDEX IF NOT EXISTS idx_code_link_file ON code_link(file);

CREATE VIRTUAL TABLE IF NOT EXISTS card_fts USING fts5(key, summary, body);

CREATE TRIGGER IF NOT EXISTS card_ai AFTER INSERT ON card BEGIN
  INSERT INTO card_fts(rowid, key, summary, body)
  VALUES (NEW.rowid, NEW.key, NEW.summary, NEW.body);
END;

CREATE TRIGGER IF NOT EXISTS card_ad AFTER DELETE ON card BEGIN
  DELETE FROM card_fts WHERE rowid = OLD.rowid;
END;

CREATE TRIGGER IF NOT EXISTS card_au AFTER UPDATE ON card BEGIN
  DELETE FROM card_fts WHERE rowid = OLD.rowid;
  INSERT INTO card_fts(rowid, key, summary, body)
  VALUES (NEW.rowid, NEW.key, NEW.summary, NEW.body);
END;
"#;
