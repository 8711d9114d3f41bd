//! SQLite-backed contract store.
//!
//! Provides persistent storage for:
//! - Contracts (every cycle is kept; one is marked active)
//! - Check-in history per contract, as one JSON document
//! - Key-value store for application state

use chrono::Utc;
use rusqlite::{params, Connection};

use super::{data_dir, ContractStore};
use crate::contract::{CheckInHistory, Contract};
use crate::error::StorageError;

const ACTIVE_CONTRACT_KEY: &str = "active_contract_id";

/// SQLite database for contracts and histories.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open the database at `~/.config/habitstake/habitstake.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        let path = data_dir()?.join("habitstake.db");
        let conn = Connection::open(&path).map_err(|source| StorageError::OpenFailed {
            path: path.clone(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS contracts (
                id          TEXT PRIMARY KEY,
                body        TEXT NOT NULL,
                saved_at    TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS histories (
                contract_id TEXT PRIMARY KEY,
                body        TEXT NOT NULL,
                saved_at    TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Every stored contract id, oldest first.
    pub fn contract_ids(&self) -> Result<Vec<String>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM contracts ORDER BY saved_at ASC, rowid ASC")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

impl ContractStore for SqliteStore {
    fn load_contract(&self) -> Result<Option<Contract>, StorageError> {
        let Some(id) = self.kv_get(ACTIVE_CONTRACT_KEY)? else {
            return Ok(None);
        };
        let mut stmt = self.conn.prepare("SELECT body FROM contracts WHERE id = ?1")?;
        let body = match stmt.query_row(params![id], |row| row.get::<_, String>(0)) {
            Ok(body) => body,
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                tracing::warn!(contract_id = %id, "active contract pointer is dangling");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&body)?))
    }

    fn save_contract(&self, contract: &Contract) -> Result<(), StorageError> {
        let body = serde_json::to_string(contract)?;
        self.conn.execute(
            "INSERT INTO contracts (id, body, saved_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET body = excluded.body",
            params![contract.id, body, Utc::now().to_rfc3339()],
        )?;
        self.kv_set(ACTIVE_CONTRACT_KEY, &contract.id)?;
        Ok(())
    }

    fn load_history(&self, contract_id: &str) -> Result<CheckInHistory, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT body FROM histories WHERE contract_id = ?1")?;
        match stmt.query_row(params![contract_id], |row| row.get::<_, String>(0)) {
            Ok(body) => Ok(serde_json::from_str(&body)?),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(CheckInHistory::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save_history(&self, contract_id: &str, history: &CheckInHistory) -> Result<(), StorageError> {
        let body = serde_json::to_string(history)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO histories (contract_id, body, saved_at) VALUES (?1, ?2, ?3)",
            params![contract_id, body, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}
