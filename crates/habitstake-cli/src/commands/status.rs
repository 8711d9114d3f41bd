use chrono::NaiveDate;
use habitstake_core::{format_cents, Dashboard};

use super::open_session;

pub fn run(json: bool, today: Option<NaiveDate>) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = open_session(today)?;
    let dashboard = session.dashboard()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&dashboard)?);
    } else {
        print_dashboard(&dashboard);
    }
    Ok(())
}

fn print_dashboard(d: &Dashboard) {
    println!("{} ({})", d.habit_title, d.today);
    match d.current_day {
        Some(day) => println!("Day {day} of {}", d.days.len()),
        None => println!("Not running today"),
    }
    if !d.auto_revealed.is_empty() {
        println!("Auto-revealed unreported days: {:?}", d.auto_revealed);
    }
    println!();

    for view in &d.days {
        let marker = if view.day_number == d.focus_day { ">" } else { " " };
        let amount = view
            .reward_cents
            .map(format_cents)
            .unwrap_or_else(|| "?".to_string());
        println!(
            "{marker} {:>2}  {}  {:<24} {:>9}",
            view.day_number,
            view.date,
            view.status.label(),
            amount
        );
    }

    println!();
    println!("Current streak: {}", d.ledger.current_streak);
    println!("Longest streak: {}", d.ledger.longest_streak);
    println!("Earned:         {}", format_cents(d.ledger.earned_cents));
    println!("Forfeited:      {}", format_cents(d.ledger.forfeited_cents));
    println!("Unrevealed:     {}", format_cents(d.unsettled_cents));
    if d.settled {
        println!("Contract settled.");
    }
}
