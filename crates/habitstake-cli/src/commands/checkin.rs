use chrono::NaiveDate;
use clap::Subcommand;
use habitstake_core::Event;

use super::open_session;

#[derive(Subcommand)]
pub enum CheckinAction {
    /// Report today's habit as done
    Done,
    /// Report today's habit as missed
    Missed,
}

pub fn run(action: CheckinAction, today: Option<NaiveDate>) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = open_session(today)?;

    let event = match action {
        CheckinAction::Done => session.check_in()?,
        CheckinAction::Missed => session.mark_missed()?,
    };

    if let Event::DayReported { day_number, status, .. } = event {
        println!("Day {day_number} recorded as {status:?}.");
        println!("Come back tomorrow to reveal the outcome.");
    }
    Ok(())
}
