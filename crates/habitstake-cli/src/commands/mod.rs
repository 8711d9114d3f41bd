pub mod checkin;
pub mod config;
pub mod contract;
pub mod reveal;
pub mod status;

use chrono::{DateTime, NaiveDate, Utc};
use habitstake_core::{Clock, Config, FixedClock, HabitSession, SqliteStore, SystemClock};

/// Wall clock, or a pinned date from `--today`.
pub enum CliClock {
    System(SystemClock),
    Fixed(FixedClock),
}

impl Clock for CliClock {
    fn today(&self) -> NaiveDate {
        match self {
            CliClock::System(c) => c.today(),
            CliClock::Fixed(c) => c.today(),
        }
    }

    fn now(&self) -> DateTime<Utc> {
        match self {
            CliClock::System(c) => c.now(),
            CliClock::Fixed(c) => c.now(),
        }
    }
}

pub type Session = HabitSession<SqliteStore, CliClock>;

/// Open the database and config in the data directory.
pub fn open_session(today: Option<NaiveDate>) -> Result<Session, Box<dyn std::error::Error>> {
    let store = SqliteStore::open()?;
    let clock = match today {
        Some(date) => {
            tracing::debug!(%date, "using pinned date");
            CliClock::Fixed(FixedClock::new(date))
        }
        None => CliClock::System(SystemClock),
    };
    Ok(HabitSession::new(store, clock, Config::load_or_default()))
}
