use std::thread;
use std::time::Duration;

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use habitstake_core::{format_cents, Event, RevealOutcome};

use super::{open_session, Session};

#[derive(Args)]
#[command(args_conflicts_with_subcommands = true)]
pub struct RevealArgs {
    /// Day to reveal; defaults to the next day awaiting a reveal
    day: Option<u32>,

    #[command(subcommand)]
    action: Option<RevealAction>,
}

#[derive(Subcommand)]
pub enum RevealAction {
    /// Reveal the oldest day awaiting a reveal
    Next,
    /// Leave a day unrevealed for now
    Skip { day: u32 },
    /// Reveal every elapsed day that was never reported
    Auto,
}

fn reveal_day(
    session: &mut Session,
    day: Option<u32>,
) -> Result<(RevealOutcome, Vec<Event>), Box<dyn std::error::Error>> {
    let result = match day {
        Some(day) => session.reveal(day)?,
        None => session.reveal_next()?,
    };
    Ok(result)
}

fn print_settlement(events: &[Event]) {
    for event in events {
        if let Event::ContractSettled {
            earned_cents,
            forfeited_cents,
            ..
        } = event
        {
            println!(
                "Contract settled: {} earned, {} forfeited.",
                format_cents(*earned_cents),
                format_cents(*forfeited_cents)
            );
        }
    }
}

pub fn run(args: RevealArgs, today: Option<NaiveDate>) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = open_session(today)?;

    let action = match args.action {
        Some(action) => action,
        None => match args.day {
            Some(day) => return reveal_and_print(&mut session, Some(day)),
            None => RevealAction::Next,
        },
    };

    match action {
        RevealAction::Next => reveal_and_print(&mut session, None)?,
        RevealAction::Skip { day } => {
            session.skip_reveal(day)?;
            println!("Day {day} left unrevealed.");
        }
        RevealAction::Auto => {
            let events = session.auto_reveal()?;
            if events.is_empty() {
                println!("Nothing to auto-reveal.");
            }
            for event in &events {
                if let Event::DaysAutoRevealed {
                    days,
                    forfeited_cents,
                    ..
                } = event
                {
                    println!(
                        "Auto-revealed {} day(s) {:?}: {} forfeited.",
                        days.len(),
                        days,
                        format_cents(*forfeited_cents)
                    );
                }
            }
            print_settlement(&events);
        }
    }
    Ok(())
}

fn reveal_and_print(
    session: &mut Session,
    day: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (outcome, events) = reveal_day(session, day)?;

    // The reveal is already saved; the pause is presentation only.
    let pause = session.config().reveal.anticipation_ms;
    if pause > 0 {
        tracing::debug!(day = outcome.day_number, pause_ms = pause, "reveal saved, pausing");
        println!("Revealing day {}...", outcome.day_number);
        thread::sleep(Duration::from_millis(pause));
    }

    if outcome.earned() {
        println!(
            "Day {}: completed. You earned {}!",
            outcome.day_number,
            format_cents(outcome.reward_cents)
        );
    } else {
        println!(
            "Day {}: missed. {} forfeited.",
            outcome.day_number,
            format_cents(outcome.reward_cents)
        );
    }
    print_settlement(&events);
    Ok(())
}
