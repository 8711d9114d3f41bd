//! Reveal controller: the per-day check-in / reveal state machine.
//!
//! ## State Transitions
//!
//! ```text
//! CurrentUnreported --check in-->    CompletedUnrevealed (visible tomorrow)
//! CurrentUnreported --mark missed--> MissedUnrevealed    (visible tomorrow)
//! Completed/MissedUnrevealed --reveal--> Completed/MissedRevealed (terminal)
//! PastUnreported --reveal--> AutoMissedRevealed (terminal)
//! *Unrevealed / PastUnreported --skip reveal--> unchanged
//! ```
//!
//! Days that elapse without an action are never written as records; the
//! resolver derives them as `PastUnreported`.
//!
//! The reveal flag is written before the outcome is returned, so any
//! presentation delay that follows cannot leave it half-applied.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::contract::{CheckInHistory, CheckInRecord, CheckInStatus, Contract};
use crate::day::{resolve_all, resolve_day, DayStatus, DayView};
use crate::error::EngineError;

/// A user action on a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayAction {
    CheckIn,
    MarkMissed,
    Reveal,
    SkipReveal,
}

impl fmt::Display for DayAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DayAction::CheckIn => "check in",
            DayAction::MarkMissed => "mark missed",
            DayAction::Reveal => "reveal",
            DayAction::SkipReveal => "skip reveal",
        })
    }
}

/// What a legal transition does to the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayEffect {
    /// Write a new, unrevealed record.
    Record(CheckInStatus),
    /// Flip `revealed` on an existing record.
    Reveal,
    /// Reveal an elapsed unreported day as an implicit miss.
    AutoReveal,
    /// Leave the day as it is; the user may reveal later.
    Defer,
}

/// The transition table. Everything not listed is rejected.
pub fn transition(day: u32, status: DayStatus, action: DayAction) -> Result<DayEffect, EngineError> {
    use DayAction::*;
    use DayStatus::*;

    match (status, action) {
        (CurrentUnreported, CheckIn) => Ok(DayEffect::Record(CheckInStatus::Completed)),
        (CurrentUnreported, MarkMissed) => Ok(DayEffect::Record(CheckInStatus::Missed)),
        (CompletedUnrevealed | MissedUnrevealed, Reveal) => Ok(DayEffect::Reveal),
        (PastUnreported, Reveal) => Ok(DayEffect::AutoReveal),
        (CompletedUnrevealed | MissedUnrevealed | PastUnreported, SkipReveal) => {
            Ok(DayEffect::Defer)
        }
        _ => Err(EngineError::InvalidTransition {
            day,
            status,
            action,
        }),
    }
}

/// Result of a reveal, for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealOutcome {
    pub day_number: u32,
    pub status: DayStatus,
    /// Earned if completed, forfeited otherwise.
    pub reward_cents: u64,
}

impl RevealOutcome {
    pub fn earned(&self) -> bool {
        self.status == DayStatus::CompletedRevealed
    }
}

/// Applies user actions to a contract's check-in history.
pub struct RevealController<'a> {
    contract: &'a Contract,
    history: CheckInHistory,
}

impl<'a> RevealController<'a> {
    pub fn new(contract: &'a Contract, history: CheckInHistory) -> Self {
        Self { contract, history }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn history(&self) -> &CheckInHistory {
        &self.history
    }

    pub fn into_history(self) -> CheckInHistory {
        self.history
    }

    pub fn views(&self, today: NaiveDate) -> Result<Vec<DayView>, EngineError> {
        resolve_all(self.contract, &self.history, today)
    }

    pub fn next_focus_day(&self, today: NaiveDate) -> Result<u32, EngineError> {
        Ok(next_focus_day(&self.views(today)?))
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Report today's habit as done.
    pub fn check_in(
        &mut self,
        day_number: u32,
        today: NaiveDate,
        at: DateTime<Utc>,
    ) -> Result<DayView, EngineError> {
        self.report(day_number, today, DayAction::CheckIn, at)
    }

    /// Report today's habit as missed.
    pub fn mark_missed(
        &mut self,
        day_number: u32,
        today: NaiveDate,
        at: DateTime<Utc>,
    ) -> Result<DayView, EngineError> {
        self.report(day_number, today, DayAction::MarkMissed, at)
    }

    /// Disclose the outcome of an earlier day.
    pub fn reveal(&mut self, day_number: u32, today: NaiveDate) -> Result<RevealOutcome, EngineError> {
        match self.validate(day_number, today, DayAction::Reveal)? {
            DayEffect::Reveal => {
                self.history.mark_revealed(day_number);
            }
            DayEffect::AutoReveal => self.history.mark_auto_revealed(day_number),
            DayEffect::Record(_) | DayEffect::Defer => {}
        }

        let view = resolve_day(day_number, self.contract, &self.history, today)?;
        tracing::info!(
            contract_id = %self.contract.id,
            day = day_number,
            status = %view.status,
            "revealed day"
        );
        Ok(RevealOutcome {
            day_number,
            status: view.status,
            reward_cents: view.reward_cents.unwrap_or_default(),
        })
    }

    /// Defer a reveal. Validates the day but changes nothing.
    pub fn skip_reveal(&mut self, day_number: u32, today: NaiveDate) -> Result<DayView, EngineError> {
        self.validate(day_number, today, DayAction::SkipReveal)?;
        resolve_day(day_number, self.contract, &self.history, today)
    }

    /// Reveal every elapsed day that was never reported. Returns the days
    /// that changed.
    pub fn auto_reveal_elapsed(&mut self, today: NaiveDate) -> Result<Vec<u32>, EngineError> {
        if !self.contract.is_active() {
            return Err(EngineError::ContractInactive);
        }
        let pending: Vec<u32> = self
            .views(today)?
            .into_iter()
            .filter(|v| v.status == DayStatus::PastUnreported)
            .map(|v| v.day_number)
            .collect();

        for day in &pending {
            self.history.mark_auto_revealed(*day);
        }
        if !pending.is_empty() {
            tracing::info!(
                contract_id = %self.contract.id,
                days = ?pending,
                "auto-revealed unreported days"
            );
        }
        Ok(pending)
    }

    fn report(
        &mut self,
        day_number: u32,
        today: NaiveDate,
        action: DayAction,
        at: DateTime<Utc>,
    ) -> Result<DayView, EngineError> {
        if let DayEffect::Record(status) = self.validate(day_number, today, action)? {
            self.history.insert(CheckInRecord {
                day_number,
                status,
                timestamp: at,
                revealed: false,
            });
            tracing::info!(
                contract_id = %self.contract.id,
                day = day_number,
                ?status,
                "recorded check-in"
            );
        }
        resolve_day(day_number, self.contract, &self.history, today)
    }

    /// Look up the transition for `action` without touching the history.
    fn validate(
        &self,
        day_number: u32,
        today: NaiveDate,
        action: DayAction,
    ) -> Result<DayEffect, EngineError> {
        if !self.contract.is_active() {
            return Err(EngineError::ContractInactive);
        }
        let view = resolve_day(day_number, self.contract, &self.history, today)?;
        transition(day_number, view.status, action).inspect_err(|_| {
            tracing::debug!(day = day_number, status = %view.status, %action, "rejected day action");
        })
    }
}

/// Day the user's attention should go to: the oldest reported day still
/// waiting for a reveal, otherwise today.
///
/// Before the contract starts this is day 1; after it ends, the last day.
pub fn next_focus_day(views: &[DayView]) -> u32 {
    if let Some(day) = views
        .iter()
        .filter(|v| v.status.awaits_reveal())
        .map(|v| v.day_number)
        .min()
    {
        return day;
    }
    if let Some(today) = views.iter().find(|v| v.is_today) {
        return today.day_number;
    }
    if views.iter().all(|v| v.is_future) {
        return 1;
    }
    views.iter().map(|v| v.day_number).max().unwrap_or(1)
}
