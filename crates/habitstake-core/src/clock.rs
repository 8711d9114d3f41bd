//! Clock collaborator.
//!
//! The engine takes `today` as an argument; only the session layer asks a
//! [`Clock`] for it, so tests and the CLI can pin the date.

use chrono::{DateTime, Local, NaiveDate, Utc};

pub trait Clock {
    /// Calendar date the user is living in.
    fn today(&self) -> NaiveDate;

    /// Instant used to timestamp check-ins.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock, local calendar date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to one date. `now()` is midday UTC on that date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    today: NaiveDate,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn advance_days(&mut self, days: i64) {
        self.today += chrono::Duration::days(days);
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.today
    }

    fn now(&self) -> DateTime<Utc> {
        self.today
            .and_hms_opt(12, 0, 0)
            .map(|dt| dt.and_utc())
            .unwrap_or_default()
    }
}
