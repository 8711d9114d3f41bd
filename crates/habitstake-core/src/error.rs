//! Core error types for habitstake-core.
//!
//! This module defines the error hierarchy using thiserror. The engine
//! surfaces [`EngineError`]; storage, configuration and the creation wizard
//! have their own enums, all wrapped by [`CoreError`].

use std::path::PathBuf;
use thiserror::Error;

use crate::day::DayStatus;
use crate::reveal::DayAction;

/// Core error type for habitstake-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Day-status and reveal engine errors
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Reward schedule generation errors
    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The store holds no contract to act on
    #[error("No active contract; create one first")]
    NoActiveContract,
}

/// Errors surfaced by the day-status resolver and the reveal controller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// An action violates the per-day state machine.
    #[error("Cannot {action} day {day} while it is {status}")]
    InvalidTransition {
        day: u32,
        status: DayStatus,
        action: DayAction,
    },

    /// The contract's reward schedule does not match its duration or deposit.
    #[error(
        "Malformed reward schedule: expected {expected_len} entries summing to {expected_sum}, \
         found {actual_len} summing to {actual_sum}"
    )]
    MalformedSchedule {
        expected_len: usize,
        actual_len: usize,
        expected_sum: u64,
        actual_sum: u64,
    },

    /// A day number outside `[1, duration]` was queried.
    #[error("Day {day} is out of range for a {duration}-day contract")]
    OutOfRangeDay { day: u32, duration: u32 },

    /// The contract's payment failed; check-ins and reveals are refused.
    #[error("Contract is not active (payment failed)")]
    ContractInactive,
}

/// Reward schedule generation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    /// Variance policy parameter outside its allowed range
    #[error("Invalid variance policy '{field}': {message}")]
    InvalidPolicy { field: String, message: String },

    /// Nothing to distribute
    #[error("Deposit must be greater than zero")]
    EmptyDeposit,
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// Stored value could not be encoded or decoded
    #[error("Corrupt stored value: {0}")]
    Json(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Data directory could not be resolved or created
    #[error("Failed to access data directory: {0}")]
    DataDir(#[from] std::io::Error),
}

/// Validation errors raised while building a contract.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Empty field
    #[error("'{0}' must not be empty")]
    Empty(String),

    /// Deposit outside the configured bounds
    #[error("Deposit of {amount} cents is outside the allowed range {min}..={max}")]
    DepositOutOfRange { amount: u64, min: u64, max: u64 },

    /// Duration not in the supported set
    #[error("Unsupported contract duration: {0} days (expected 7, 14, 21 or 30)")]
    UnsupportedDuration(u32),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseLocked {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
