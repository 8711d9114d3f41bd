use chrono::NaiveDate;
use clap::Subcommand;
use habitstake_core::{
    format_cents, parse_dollars, validate_schedule, Contract, ContractDraft, ContractDuration,
    PaymentStatus, StartDate,
};
use serde::Serialize;

use super::open_session;

#[derive(Subcommand)]
pub enum ContractAction {
    /// Create a new contract and make it active
    Create {
        /// Habit to commit to
        title: String,
        /// Contract length in days (7, 14, 21 or 30)
        #[arg(long)]
        days: u32,
        /// Deposit in dollars (e.g. "140" or "140.50")
        #[arg(long)]
        deposit: String,
        /// First day: "today" or "tomorrow"
        #[arg(long, default_value = "today")]
        start: String,
    },
    /// Show the active contract
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Verify the stored reward schedule
    ScheduleCheck,
    /// Set the payment status (pending, paid, failed)
    Payment {
        status: String,
    },
}

/// Public view of a contract. The reward schedule stays hidden.
#[derive(Serialize)]
struct ContractSummary<'a> {
    id: &'a str,
    habit_title: &'a str,
    duration_days: u32,
    deposit_cents: u64,
    start: StartDate,
    created_on: NaiveDate,
    first_day: NaiveDate,
    last_day: NaiveDate,
    payment_status: PaymentStatus,
}

impl<'a> From<&'a Contract> for ContractSummary<'a> {
    fn from(c: &'a Contract) -> Self {
        Self {
            id: &c.id,
            habit_title: &c.habit_title,
            duration_days: c.duration.days(),
            deposit_cents: c.deposit_cents,
            start: c.start,
            created_on: c.created_on,
            first_day: c.first_day(),
            last_day: c.last_day(),
            payment_status: c.payment_status,
        }
    }
}

fn print_contract(contract: &Contract) {
    println!("Contract: {}", contract.id);
    println!("  Habit:    {}", contract.habit_title);
    println!("  Duration: {}", contract.duration);
    println!("  Deposit:  {}", format_cents(contract.deposit_cents));
    println!(
        "  Runs:     {} .. {}",
        contract.first_day(),
        contract.last_day()
    );
    println!("  Payment:  {:?}", contract.payment_status);
}

pub fn run(
    action: ContractAction,
    today: Option<NaiveDate>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = open_session(today)?;

    match action {
        ContractAction::Create {
            title,
            days,
            deposit,
            start,
        } => {
            let draft = ContractDraft::new(
                title,
                ContractDuration::try_from(days)?,
                parse_dollars(&deposit)?,
            )
            .starting(start.parse()?);
            let (contract, _) = session.create_contract(draft)?;
            println!("Contract created: {}", contract.id);
            print_contract(&contract);
        }
        ContractAction::Show { json } => {
            let contract = session.contract()?;
            if json {
                let summary = ContractSummary::from(&contract);
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_contract(&contract);
            }
        }
        ContractAction::ScheduleCheck => {
            let contract = session.contract()?;
            validate_schedule(&contract)?;
            println!(
                "schedule ok: {} days, {} total",
                contract.reward_schedule.len(),
                format_cents(contract.deposit_cents)
            );
        }
        ContractAction::Payment { status } => {
            let contract = session.set_payment_status(status.parse()?)?;
            println!("payment status: {:?}", contract.payment_status);
        }
    }
    Ok(())
}
