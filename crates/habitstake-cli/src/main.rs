use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "habitstake-cli", version, about = "Habitstake CLI")]
struct Cli {
    /// Pretend today is this date (YYYY-MM-DD)
    #[arg(long, global = true)]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Contract creation and inspection
    Contract {
        #[command(subcommand)]
        action: commands::contract::ContractAction,
    },
    /// Report today's habit
    Checkin {
        #[command(subcommand)]
        action: commands::checkin::CheckinAction,
    },
    /// Reveal day outcomes
    Reveal(commands::reveal::RevealArgs),
    /// Show the contract dashboard
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("HABITSTAKE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let today = cli.today;
    let result = match cli.command {
        Commands::Contract { action } => commands::contract::run(action, today),
        Commands::Checkin { action } => commands::checkin::run(action, today),
        Commands::Reveal(args) => commands::reveal::run(args, today),
        Commands::Status { json } => commands::status::run(json, today),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
