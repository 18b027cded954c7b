//! Sqlite store backend
//!
//! `KvStore` over a single sqlite file: one table of JSON-encoded records,
//! one of set members. The connection sits behind a mutex; statements are
//! short and the reminder workload is tiny, so contention is not a concern.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.3.0
//!
//! ## Changelog
//! - 1.1.0: JSON-encode record fields instead of one column per field
//! - 1.0.0: Initial implementation

use anyhow::{anyhow, Context as _, Result};
use async_trait::async_trait;
use sqlite::{Connection, State};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::KvStore;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS kv_records (
    key    TEXT PRIMARY KEY,
    fields TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS kv_set_members (
    key    TEXT NOT NULL,
    member TEXT NOT NULL,
    PRIMARY KEY (key, member)
);
";

#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and ensure the schema.
    /// Pass `":memory:"` for a throwaway database.
    pub fn open(path: &str) -> Result<SqliteStore> {
        let conn =
            sqlite::open(path).with_context(|| format!("opening store database at {path}"))?;
        conn.execute(SCHEMA).context("creating store schema")?;
        Ok(SqliteStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("store connection mutex poisoned"))
    }
}

#[async_trait]
impl KvStore for SqliteStore {
    async fn add_to_set(&self, key: &str, member: &str) -> Result<()> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("INSERT OR IGNORE INTO kv_set_members (key, member) VALUES (?, ?)")?;
        stmt.bind((1, key))?;
        stmt.bind((2, member))?;
        stmt.next()?;
        Ok(())
    }

    async fn remove_from_set(&self, key: &str, member: &str) -> Result<()> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("DELETE FROM kv_set_members WHERE key = ? AND member = ?")?;
        stmt.bind((1, key))?;
        stmt.bind((2, member))?;
        stmt.next()?;
        Ok(())
    }

    async fn set_exists(&self, key: &str) -> Result<bool> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT 1 FROM kv_set_members WHERE key = ? LIMIT 1")?;
        stmt.bind((1, key))?;
        Ok(matches!(stmt.next()?, State::Row))
    }

    async fn members_of(&self, key: &str) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT member FROM kv_set_members WHERE key = ?")?;
        stmt.bind((1, key))?;

        let mut members = Vec::new();
        while let State::Row = stmt.next()? {
            members.push(stmt.read::<String, _>(0)?);
        }
        Ok(members)
    }

    async fn get_record(&self, key: &str) -> Result<Option<HashMap<String, String>>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT fields FROM kv_records WHERE key = ?")?;
        stmt.bind((1, key))?;

        match stmt.next()? {
            State::Row => {
                let raw = stmt.read::<String, _>(0)?;
                let fields = serde_json::from_str(&raw)
                    .with_context(|| format!("record at {key} holds malformed JSON"))?;
                Ok(Some(fields))
            }
            State::Done => Ok(None),
        }
    }

    async fn put_record(&self, key: &str, fields: HashMap<String, String>) -> Result<()> {
        let raw = serde_json::to_string(&fields).context("encoding record fields")?;
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("INSERT OR REPLACE INTO kv_records (key, fields) VALUES (?, ?)")?;
        stmt.bind((1, key))?;
        stmt.bind((2, raw.as_str()))?;
        stmt.next()?;
        Ok(())
    }

    async fn delete_record(&self, key: &str) -> Result<()> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("DELETE FROM kv_records WHERE key = ?")?;
        stmt.bind((1, key))?;
        stmt.next()?;
        Ok(())
    }
}
