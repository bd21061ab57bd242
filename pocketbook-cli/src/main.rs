//! Pocketbook CLI - expenses, income and sales in your terminal

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use pocketbook_core::{LogEvent, RecordKind, Rejection};

mod commands;
mod output;

use commands::{budget, category, export, logs, record, recurring, report, savings, status};

/// Pocketbook - expense, income and sales tracking
#[derive(Parser)]
#[command(name = "pb", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add, list and delete expenses
    Expense {
        #[command(subcommand)]
        command: record::RecordCommands,
    },

    /// Add, list and delete income
    Income {
        #[command(subcommand)]
        command: record::RecordCommands,
    },

    /// Add, list and delete sales
    Sale {
        #[command(subcommand)]
        command: record::RecordCommands,
    },

    /// Manage spending categories
    Category {
        #[command(subcommand)]
        command: category::CategoryCommands,
    },

    /// Manage savings contributions
    Savings {
        #[command(subcommand)]
        command: savings::SavingsCommands,
    },

    /// Show or set the monthly budget
    Budget {
        /// New budget amount; 0 clears it
        amount: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage recurring payments and income
    Recurring {
        #[command(subcommand)]
        command: recurring::RecurringCommands,
    },

    /// Summaries, breakdowns and series
    Report {
        #[command(subcommand)]
        command: report::ReportCommands,
    },

    /// Export all tables as CSV
    Export {
        /// Write a zip archive with one CSV per table
        #[arg(long)]
        zip: bool,
        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the acting user and local storage status
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// View and manage the event log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<Rejection>() {
                Some(rejection) => output::error(&format!("Rejected: {}", rejection)),
                None => {
                    output::error(&format!("{:#}", e));
                    commands::log_event(
                        &commands::get_logger(),
                        LogEvent::new("command_failed").with_error(format!("{:#}", e)),
                    );
                }
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        match cli.command {
            Commands::Expense { command } => record::run(RecordKind::Expense, command).await,
            Commands::Income { command } => record::run(RecordKind::Income, command).await,
            Commands::Sale { command } => record::run(RecordKind::Sale, command).await,
            Commands::Category { command } => category::run(command).await,
            Commands::Savings { command } => savings::run(command).await,
            Commands::Budget { amount, json } => budget::run(amount, json).await,
            Commands::Recurring { command } => recurring::run(command).await,
            Commands::Report { command } => report::run(command).await,
            Commands::Export { zip, output, json } => export::run(zip, output, json).await,
            Commands::Status { json } => status::run(json),
            Commands::Logs { command } => logs::run(command),
        }
    })
}
