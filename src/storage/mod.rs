mod schema;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

pub(crate) const TRANSACTIONS_KEY: &str = "finance-transactions";
pub(crate) const BUDGETS_KEY: &str = "finance-budgets";

/// Whole-value key-value persistence. Collections are always read and
/// written in full under a single key.
pub(crate) trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

pub(crate) struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .context("Failed to set database pragmas")?;
        let mut storage = Self { conn };
        storage.migrate().context("Database migration failed")?;
        Ok(storage)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let mut storage = Self { conn };
        storage.migrate()?;
        Ok(storage)
    }

    /// Create the schema on a fresh database, otherwise bring an older one
    /// up to `CURRENT_VERSION`. A database written by a newer build is
    /// refused.
    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            return Ok(());
        }

        let stored = self.schema_version()?;
        if stored > schema::CURRENT_VERSION {
            anyhow::bail!(
                "Database schema version {stored} is newer than supported version {}",
                schema::CURRENT_VERSION
            );
        }
        if stored == schema::CURRENT_VERSION {
            return Ok(());
        }

        for &(from_version, sql) in schema::MIGRATIONS {
            if from_version >= stored {
                self.conn
                    .execute_batch(sql)
                    .with_context(|| format!("Migration from version {from_version} failed"))?;
            }
        }
        self.conn.execute(
            "UPDATE schema_version SET version = ?1",
            params![schema::CURRENT_VERSION],
        )?;
        tracing::info!(from = stored, to = schema::CURRENT_VERSION, "migrated database");
        Ok(())
    }

    fn schema_version(&self) -> Result<i32> {
        self.conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .context("Failed to read schema version")
    }
}

impl Storage for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = ?3",
            params![key, value, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct MemoryStorage {
    entries: std::collections::HashMap<String, String>,
}

#[cfg(test)]
impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Load a collection stored under `key`.
///
/// A missing key, an unreadable backend or a value that does not parse all
/// yield an empty collection. Only the last two are logged.
pub(crate) fn load_collection<T: DeserializeOwned>(storage: &impl Storage, key: &str) -> Vec<T> {
    let raw = match storage.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to read collection, starting empty");
            return Vec::new();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(key, error = %e, "malformed collection, starting empty");
            Vec::new()
        }
    }
}

pub(crate) fn save_collection<T: Serialize>(
    storage: &mut impl Storage,
    key: &str,
    items: &[T],
) -> Result<()> {
    let raw = serde_json::to_string(items)
        .with_context(|| format!("Failed to serialize collection '{key}'"))?;
    storage
        .set(key, &raw)
        .with_context(|| format!("Failed to write collection '{key}'"))
}
