use std::collections::HashMap;

use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};

/// Synchronous string key/value storage the progress store persists into.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

pub struct SqliteKv {
    conn: Connection,
}

impl SqliteKv {
    pub fn new(path: &str) -> Result<Self> {
        Ok(Self { conn: Connection::open(path)? })
    }

    pub fn in_memory() -> Result<Self> {
        Ok(Self { conn: Connection::open_in_memory()? })
    }

    pub fn init(&mut self) -> Result<()> {
        self.conn.execute_batch(
            "BEGIN;
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL
            );
            COMMIT;",
        )?;
        Ok(())
    }

    /// Open and create the schema in one step.
    pub fn open(path: &str) -> Result<Self> {
        let mut kv = Self::new(path)?;
        kv.init()?;
        Ok(kv)
    }
}

impl KvStore for SqliteKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

/// Non-persistent store for tests and throwaway sessions.
#[derive(Debug, Default, Clone)]
pub struct MemoryKv {
    entries: HashMap<String, String>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(kv: &mut dyn KvStore) {
        assert_eq!(kv.get("xp").unwrap(), None);
        kv.set("xp", "{\"Kracht\":10}").unwrap();
        assert_eq!(kv.get("xp").unwrap().as_deref(), Some("{\"Kracht\":10}"));
        kv.set("xp", "{\"Kracht\":20}").unwrap();
        assert_eq!(kv.get("xp").unwrap().as_deref(), Some("{\"Kracht\":20}"));
        kv.remove("xp").unwrap();
        assert_eq!(kv.get("xp").unwrap(), None);
        // Removing a missing key is fine.
        kv.remove("xp").unwrap();
    }

    #[test]
    fn test_memory_kv() {
        let mut kv = MemoryKv::new();
        exercise(&mut kv);
        assert!(kv.is_empty());
    }

    #[test]
    fn test_sqlite_kv_in_memory() {
        let mut kv = SqliteKv::in_memory().unwrap();
        kv.init().unwrap();
        exercise(&mut kv);
    }

    #[test]
    fn test_sqlite_kv_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ace.sqlite");
        let path = path.to_str().unwrap();
        {
            let mut kv = SqliteKv::open(path).unwrap();
            kv.set("lastCheck", "{}").unwrap();
        }
        let kv = SqliteKv::open(path).unwrap();
        assert_eq!(kv.get("lastCheck").unwrap().as_deref(), Some("{}"));
    }
}
