//! Streak and ledger aggregation over resolved days.
//!
//! Only revealed days move the totals or extend a streak. Unrevealed past
//! days break a running streak but leave the current streak, which is
//! measured at the latest revealed day, untouched.

use serde::{Deserialize, Serialize};

use crate::day::{DayStatus, DayView};

/// Streaks and money totals derived from revealed days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub earned_cents: u64,
    pub forfeited_cents: u64,
}

impl LedgerSummary {
    /// Total amount whose outcome has been revealed.
    pub fn settled_cents(&self) -> u64 {
        self.earned_cents + self.forfeited_cents
    }
}

/// Aggregate past days. Views for today or future days are skipped.
pub fn aggregate(views: &[DayView]) -> LedgerSummary {
    let mut summary = LedgerSummary::default();
    let mut run: u32 = 0;

    let mut past: Vec<&DayView> = views
        .iter()
        .filter(|v| !v.is_today && !v.is_future)
        .collect();
    past.sort_by_key(|v| v.day_number);

    for view in past {
        if view.status == DayStatus::CompletedRevealed {
            run += 1;
            summary.longest_streak = summary.longest_streak.max(run);
            summary.current_streak = run;
            summary.earned_cents += view.reward_cents.unwrap_or(0);
        } else if view.status.is_forfeit() {
            run = 0;
            summary.current_streak = 0;
            summary.forfeited_cents += view.reward_cents.unwrap_or(0);
        } else {
            // Reported or elapsed but not yet revealed.
            run = 0;
        }
    }

    summary
}
