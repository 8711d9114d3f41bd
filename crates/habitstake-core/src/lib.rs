//! # Habitstake Core Library
//!
//! Business logic for habit contracts: a user deposits money, commits to a
//! daily habit for a fixed number of days, and earns back a hidden, varying
//! amount for each day they check in. Missed days forfeit their amount.
//!
//! ## Architecture
//!
//! - **Reward Schedule**: seeded partition of the deposit into per-day
//!   amounts, fixed at creation time
//! - **Day Resolver**: pure derivation of each day's status from the
//!   contract, the check-in history and today's date
//! - **Ledger**: streaks and earned/forfeited totals over revealed days
//! - **Reveal Controller**: per-day state machine for check-ins and the
//!   next-day reveal of outcomes
//! - **Storage**: `ContractStore` trait with SQLite and in-memory backends,
//!   TOML configuration
//!
//! The engine never reads the system clock or decides when to persist;
//! [`HabitSession`] is the calling layer that does both.

pub mod clock;
pub mod contract;
pub mod day;
pub mod error;
pub mod events;
pub mod ledger;
pub mod reveal;
pub mod schedule;
pub mod session;
pub mod storage;

pub use clock::{Clock, FixedClock, SystemClock};
pub use contract::{
    format_cents, parse_dollars, CheckInHistory, CheckInRecord, CheckInStatus, Contract,
    ContractDraft, ContractDuration, PaymentStatus, StartDate, WizardConfig,
};
pub use day::{resolve_all, resolve_day, DayStatus, DayView};
pub use error::{ConfigError, CoreError, EngineError, ScheduleError, StorageError, ValidationError};
pub use events::Event;
pub use ledger::{aggregate, LedgerSummary};
pub use reveal::{next_focus_day, transition, DayAction, DayEffect, RevealController, RevealOutcome};
pub use schedule::{generate_schedule, validate_schedule, VariancePolicy};
pub use session::{Dashboard, HabitSession};
pub use storage::{data_dir, Config, ContractStore, MemoryStore, RevealConfig, SqliteStore};
