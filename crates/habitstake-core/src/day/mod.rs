//! Day status resolution.
//!
//! Derives the display status of every contract day from the contract, the
//! check-in history and the caller-supplied date. Pure: nothing here reads a
//! clock or writes history.
//!
//! ## Status table
//!
//! ```text
//! day > current                       -> LockedFuture
//! day == current, no record           -> CurrentUnreported
//! day == current, record              -> CurrentPendingReveal
//! day < current, no record, revealed  -> AutoMissedRevealed
//! day < current, no record            -> PastUnreported
//! record completed / missed x revealed / unrevealed
//! ```
//!
//! A day's amount is exposed only once the day is revealed, and a day can
//! only be revealed after it stops being the current day.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::contract::{CheckInHistory, CheckInStatus, Contract};
use crate::error::EngineError;
use crate::schedule::validate_schedule;

/// Display status of a single contract day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    LockedFuture,
    CurrentUnreported,
    /// Reported today; outcome withheld until tomorrow.
    CurrentPendingReveal,
    /// Elapsed without a report; an implicit miss not yet revealed.
    PastUnreported,
    /// Elapsed without a report; implicit miss revealed.
    AutoMissedRevealed,
    CompletedUnrevealed,
    CompletedRevealed,
    MissedUnrevealed,
    MissedRevealed,
}

impl DayStatus {
    /// Outcome has been disclosed; terminal for the day.
    pub fn is_revealed(self) -> bool {
        matches!(
            self,
            DayStatus::CompletedRevealed | DayStatus::MissedRevealed | DayStatus::AutoMissedRevealed
        )
    }

    /// Reported on an earlier day and waiting for the user to reveal it.
    pub fn awaits_reveal(self) -> bool {
        matches!(
            self,
            DayStatus::CompletedUnrevealed | DayStatus::MissedUnrevealed
        )
    }

    /// Counts as forfeited once revealed.
    pub fn is_forfeit(self) -> bool {
        matches!(
            self,
            DayStatus::MissedRevealed | DayStatus::AutoMissedRevealed
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            DayStatus::LockedFuture => "locked",
            DayStatus::CurrentUnreported => "today, not checked in",
            DayStatus::CurrentPendingReveal => "today, reveal tomorrow",
            DayStatus::PastUnreported => "not reported",
            DayStatus::AutoMissedRevealed => "missed (not reported)",
            DayStatus::CompletedUnrevealed => "completed, ready to reveal",
            DayStatus::CompletedRevealed => "completed",
            DayStatus::MissedUnrevealed => "missed, ready to reveal",
            DayStatus::MissedRevealed => "missed",
        }
    }
}

impl fmt::Display for DayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Derived view of one day. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayView {
    pub day_number: u32,
    pub date: NaiveDate,
    pub status: DayStatus,
    /// Present only for revealed days.
    pub reward_cents: Option<u64>,
    pub is_today: bool,
    pub is_future: bool,
}

/// Resolve the status of a single day.
///
/// # Errors
///
/// `OutOfRangeDay` if `day_number` is outside `[1, duration]`,
/// `MalformedSchedule` if the contract's schedule is inconsistent.
pub fn resolve_day(
    day_number: u32,
    contract: &Contract,
    history: &CheckInHistory,
    today: NaiveDate,
) -> Result<DayView, EngineError> {
    let duration = contract.duration.days();
    if day_number == 0 || day_number > duration {
        return Err(EngineError::OutOfRangeDay {
            day: day_number,
            duration,
        });
    }
    validate_schedule(contract)?;
    Ok(resolve_checked(day_number, contract, history, today))
}

/// Resolve every day of the contract in ascending order.
pub fn resolve_all(
    contract: &Contract,
    history: &CheckInHistory,
    today: NaiveDate,
) -> Result<Vec<DayView>, EngineError> {
    validate_schedule(contract)?;

    let duration = contract.duration.days();
    let stray = history.out_of_range_days(duration);
    if !stray.is_empty() {
        tracing::warn!(
            contract_id = %contract.id,
            days = ?stray,
            "ignoring history entries outside the contract"
        );
    }

    Ok((1..=duration)
        .map(|day| resolve_checked(day, contract, history, today))
        .collect())
}

fn resolve_checked(
    day_number: u32,
    contract: &Contract,
    history: &CheckInHistory,
    today: NaiveDate,
) -> DayView {
    let current = contract.current_position(today);
    let day = i64::from(day_number);
    let record = history.get(day_number);

    let status = if day > current {
        DayStatus::LockedFuture
    } else if day == current {
        match record {
            None => DayStatus::CurrentUnreported,
            Some(_) => DayStatus::CurrentPendingReveal,
        }
    } else {
        match record {
            None if history.is_auto_revealed(day_number) => DayStatus::AutoMissedRevealed,
            None => DayStatus::PastUnreported,
            Some(r) => match (r.status, r.revealed) {
                (CheckInStatus::Completed, false) => DayStatus::CompletedUnrevealed,
                (CheckInStatus::Completed, true) => DayStatus::CompletedRevealed,
                (CheckInStatus::Missed, false) => DayStatus::MissedUnrevealed,
                (CheckInStatus::Missed, true) => DayStatus::MissedRevealed,
            },
        }
    };

    let reward_cents = if status.is_revealed() {
        contract
            .reward_schedule
            .get(day_number as usize - 1)
            .copied()
    } else {
        None
    };

    DayView {
        day_number,
        date: contract.date_of(day_number),
        status,
        reward_cents,
        is_today: day == current,
        is_future: day > current,
    }
}
