//! Habit contract data model.
//!
//! A [`Contract`] is created once by the wizard ([`ContractDraft`]) with its
//! reward schedule already embedded, and is immutable afterwards except for
//! the payment status, which belongs to the payment collaborator.

mod history;
mod wizard;

pub use history::{CheckInHistory, CheckInRecord, CheckInStatus};
pub use wizard::{ContractDraft, WizardConfig};

use std::fmt;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Supported contract lengths. Serialized as the plain day count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum ContractDuration {
    Week,
    TwoWeeks,
    ThreeWeeks,
    Month,
}

impl ContractDuration {
    pub const ALL: [ContractDuration; 4] = [
        ContractDuration::Week,
        ContractDuration::TwoWeeks,
        ContractDuration::ThreeWeeks,
        ContractDuration::Month,
    ];

    /// Number of days in the contract.
    pub fn days(self) -> u32 {
        match self {
            ContractDuration::Week => 7,
            ContractDuration::TwoWeeks => 14,
            ContractDuration::ThreeWeeks => 21,
            ContractDuration::Month => 30,
        }
    }
}

impl TryFrom<u32> for ContractDuration {
    type Error = ValidationError;

    fn try_from(days: u32) -> Result<Self, Self::Error> {
        match days {
            7 => Ok(ContractDuration::Week),
            14 => Ok(ContractDuration::TwoWeeks),
            21 => Ok(ContractDuration::ThreeWeeks),
            30 => Ok(ContractDuration::Month),
            other => Err(ValidationError::UnsupportedDuration(other)),
        }
    }
}

impl From<ContractDuration> for u32 {
    fn from(duration: ContractDuration) -> Self {
        duration.days()
    }
}

impl fmt::Display for ContractDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} days", self.days())
    }
}

/// Which calendar day is day 1, relative to the creation date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StartDate {
    #[default]
    Today,
    Tomorrow,
}

impl StartDate {
    fn offset_days(self) -> i64 {
        match self {
            StartDate::Today => 0,
            StartDate::Tomorrow => 1,
        }
    }
}

impl std::str::FromStr for StartDate {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "today" => Ok(StartDate::Today),
            "tomorrow" => Ok(StartDate::Tomorrow),
            other => Err(ValidationError::InvalidValue {
                field: "start".into(),
                message: format!("expected 'today' or 'tomorrow', got '{other}'"),
            }),
        }
    }
}

/// Payment state, written only by the payment collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
}

impl std::str::FromStr for PaymentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            "failed" => Ok(PaymentStatus::Failed),
            other => Err(ValidationError::InvalidValue {
                field: "payment_status".into(),
                message: format!("expected pending, paid or failed, got '{other}'"),
            }),
        }
    }
}

/// A single habit commitment cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    /// Opaque unique id; also the reward schedule seed.
    pub id: String,
    pub habit_title: String,
    pub duration: ContractDuration,
    pub deposit_cents: u64,
    pub start: StartDate,
    /// Calendar date the contract was created on.
    pub created_on: NaiveDate,
    /// Hidden per-day amounts, `duration` entries summing to `deposit_cents`.
    pub reward_schedule: Vec<u64>,
    #[serde(default)]
    pub payment_status: PaymentStatus,
}

impl Contract {
    /// Calendar date of day 1.
    pub fn first_day(&self) -> NaiveDate {
        self.created_on + Duration::days(self.start.offset_days())
    }

    /// Calendar date of the last day.
    pub fn last_day(&self) -> NaiveDate {
        self.first_day() + Duration::days(i64::from(self.duration.days()) - 1)
    }

    /// Calendar date of a 1-indexed day.
    pub fn date_of(&self, day_number: u32) -> NaiveDate {
        self.first_day() + Duration::days(i64::from(day_number) - 1)
    }

    /// Position of `today` within the contract.
    ///
    /// Below 1 before the contract starts, above `duration` once it is over.
    pub fn current_position(&self, today: NaiveDate) -> i64 {
        (today - self.first_day()).num_days() + 1
    }

    /// The current day if `today` falls inside the contract.
    pub fn current_day(&self, today: NaiveDate) -> Option<u32> {
        let pos = self.current_position(today);
        if pos >= 1 && pos <= i64::from(self.duration.days()) {
            u32::try_from(pos).ok()
        } else {
            None
        }
    }

    /// Everything except a failed payment counts as active.
    pub fn is_active(&self) -> bool {
        self.payment_status != PaymentStatus::Failed
    }

    /// Entry point for the payment collaborator.
    pub fn set_payment_status(&mut self, status: PaymentStatus) {
        self.payment_status = status;
    }
}

/// Format a cent amount as dollars, e.g. `2050` -> `$20.50`.
pub fn format_cents(cents: u64) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}

/// Parse a dollar amount such as `140`, `140.5` or `$140.50` into cents.
pub fn parse_dollars(input: &str) -> Result<u64, ValidationError> {
    let invalid = || ValidationError::InvalidValue {
        field: "deposit".into(),
        message: format!("'{input}' is not a dollar amount"),
    };

    let trimmed = input.trim().trim_start_matches('$');
    let (whole, frac) = match trimmed.split_once('.') {
        Some((w, f)) => (w, f),
        None => (trimmed, ""),
    };
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if whole.is_empty() || frac.len() > 2 || !all_digits(whole) || !all_digits(frac) {
        return Err(invalid());
    }
    let dollars: u64 = whole.parse().map_err(|_| invalid())?;
    let cents: u64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<u64>().map_err(|_| invalid())? * 10,
        _ => frac.parse().map_err(|_| invalid())?,
    };
    dollars
        .checked_mul(100)
        .and_then(|c| c.checked_add(cents))
        .ok_or_else(invalid)
}
