//! Storage collaborator.
//!
//! The engine only ever sees whole values: a contract and its check-in
//! history. [`ContractStore`] is the seam; [`MemoryStore`] backs tests and
//! [`SqliteStore`] backs the CLI.

mod config;
pub mod database;

pub use config::{Config, RevealConfig};
pub use database::SqliteStore;

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::contract::{CheckInHistory, Contract};
use crate::error::StorageError;

/// Whole-value reads and writes of the active contract and its history.
pub trait ContractStore {
    /// The active contract, if one has been created.
    fn load_contract(&self) -> Result<Option<Contract>, StorageError>;

    /// Replace the active contract.
    fn save_contract(&self, contract: &Contract) -> Result<(), StorageError>;

    /// History for a contract; empty if nothing was saved yet.
    fn load_history(&self, contract_id: &str) -> Result<CheckInHistory, StorageError>;

    fn save_history(&self, contract_id: &str, history: &CheckInHistory) -> Result<(), StorageError>;
}

/// In-memory store for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    contract: RefCell<Option<Contract>>,
    histories: RefCell<HashMap<String, CheckInHistory>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ContractStore for MemoryStore {
    fn load_contract(&self) -> Result<Option<Contract>, StorageError> {
        Ok(self.contract.borrow().clone())
    }

    fn save_contract(&self, contract: &Contract) -> Result<(), StorageError> {
        *self.contract.borrow_mut() = Some(contract.clone());
        Ok(())
    }

    fn load_history(&self, contract_id: &str) -> Result<CheckInHistory, StorageError> {
        Ok(self
            .histories
            .borrow()
            .get(contract_id)
            .cloned()
            .unwrap_or_default())
    }

    fn save_history(&self, contract_id: &str, history: &CheckInHistory) -> Result<(), StorageError> {
        self.histories
            .borrow_mut()
            .insert(contract_id.to_string(), history.clone());
        Ok(())
    }
}

/// Returns the data directory, creating it if needed.
///
/// `HABITSTAKE_DATA_DIR` overrides the location outright. Otherwise it is
/// `~/.config/habitstake[-dev]/`, with `HABITSTAKE_ENV=dev` selecting the
/// development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = match std::env::var_os("HABITSTAKE_DATA_DIR") {
        Some(custom) => PathBuf::from(custom),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("HABITSTAKE_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("habitstake-dev")
            } else {
                base_dir.join("habitstake")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{ContractDuration, PaymentStatus, StartDate};
    use chrono::NaiveDate;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.load_contract().unwrap().is_none());
        assert!(store.load_history("nope").unwrap().is_empty());

        let contract = Contract {
            id: "m-1".into(),
            habit_title: "Walk".into(),
            duration: ContractDuration::Week,
            deposit_cents: 700,
            start: StartDate::Today,
            created_on: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            reward_schedule: vec![100; 7],
            payment_status: PaymentStatus::Pending,
        };
        store.save_contract(&contract).unwrap();
        assert_eq!(store.load_contract().unwrap(), Some(contract));
    }
}
