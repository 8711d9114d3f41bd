use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::contract::{CheckInStatus, ContractDuration};
use crate::day::DayStatus;

/// Every state change in the system produces an Event.
/// Front-ends print or animate them; nothing in the engine depends on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    ContractCreated {
        contract_id: String,
        duration: ContractDuration,
        deposit_cents: u64,
        first_day: chrono::NaiveDate,
        at: DateTime<Utc>,
    },
    DayReported {
        day_number: u32,
        status: CheckInStatus,
        at: DateTime<Utc>,
    },
    /// Outcome disclosed. Recorded before any presentation delay.
    DayRevealed {
        day_number: u32,
        status: DayStatus,
        reward_cents: u64,
        at: DateTime<Utc>,
    },
    RevealDeferred {
        day_number: u32,
        at: DateTime<Utc>,
    },
    /// Elapsed unreported days revealed as misses.
    DaysAutoRevealed {
        days: Vec<u32>,
        forfeited_cents: u64,
        at: DateTime<Utc>,
    },
    /// Every day has been revealed.
    ContractSettled {
        contract_id: String,
        earned_cents: u64,
        forfeited_cents: u64,
        at: DateTime<Utc>,
    },
}
