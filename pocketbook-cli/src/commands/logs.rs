//! Logs command - view and manage the event log

use anyhow::Result;
use chrono::{Duration, TimeZone, Utc};
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Confirm;
use pocketbook_core::{EntryPoint, LoggingService};

use super::get_data_dir;
use crate::output::create_table;

#[derive(Subcommand)]
pub enum LogsCommands {
    /// Show recent log entries
    List {
        /// Number of entries to show
        #[arg(short, long, default_value = "50")]
        limit: usize,
        /// Show only errors
        #[arg(long)]
        errors: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete old entries, or all of them
    Clear {
        /// Delete entries older than N days
        #[arg(long, default_value = "30", conflicts_with = "all")]
        older_than_days: i64,
        /// Delete every entry
        #[arg(long)]
        all: bool,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Entry counts per event and the log location
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn open_log() -> Result<LoggingService> {
    let data_dir = get_data_dir()?;
    std::fs::create_dir_all(&data_dir)?;
    LoggingService::new(&data_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION"))
}

fn format_timestamp(timestamp_ms: i64) -> String {
    Utc.timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| timestamp_ms.to_string())
}

pub fn run(command: LogsCommands) -> Result<()> {
    let service = open_log()?;
    match command {
        LogsCommands::List {
            limit,
            errors,
            json,
        } => list(&service, limit, errors, json),
        LogsCommands::Clear {
            older_than_days,
            all,
            force,
            json,
        } => clear(&service, older_than_days, all, force, json),
        LogsCommands::Stats { json } => stats(&service, json),
    }
}

fn list(service: &LoggingService, limit: usize, errors_only: bool, json: bool) -> Result<()> {
    let entries = if errors_only {
        service.get_errors(limit)?
    } else {
        service.get_recent(limit)?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No log entries found.");
        return Ok(());
    }

    let mut table = create_table();
    table.set_header(vec!["Time", "Event", "Table", "Command", "Error"]);
    for entry in &entries {
        table.add_row(vec![
            format_timestamp(entry.timestamp),
            entry.event.clone(),
            entry.table.clone().unwrap_or_default(),
            entry.command.clone().unwrap_or_default(),
            entry
                .error_message
                .as_deref()
                .map(|m| m.red().to_string())
                .unwrap_or_default(),
        ]);
    }
    println!("{}", table);

    let error_count = entries.iter().filter(|e| e.error_message.is_some()).count();
    if !errors_only && error_count > 0 {
        println!(
            "{}",
            format!("{} of these are errors; `pb logs list --errors` shows only those.", error_count)
                .dimmed()
        );
    }
    Ok(())
}

fn clear(service: &LoggingService, older_than_days: i64, all: bool, force: bool, json: bool) -> Result<()> {
    if !force && !json {
        let prompt = if all {
            "Delete all log entries?".to_string()
        } else {
            format!("Delete log entries older than {} days?", older_than_days)
        };
        if !Confirm::new().with_prompt(prompt).default(false).interact()? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let deleted = if all {
        service.clear()?
    } else {
        let cutoff = Utc::now() - Duration::days(older_than_days);
        service.delete_before(cutoff.timestamp_millis())?
    };

    if json {
        println!("{}", serde_json::json!({ "deleted": deleted }));
    } else {
        println!("Deleted {} log entries", deleted);
    }
    Ok(())
}

fn stats(service: &LoggingService, json: bool) -> Result<()> {
    let total = service.count()?;
    let events = service.event_counts()?;
    let db_path = service.db_path();
    let size_bytes = std::fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "total_entries": total,
                "events": events,
                "database_path": db_path.to_string_lossy(),
                "database_size_bytes": size_bytes,
            }))?
        );
        return Ok(());
    }

    println!("{}", "Event log".bold());
    println!("  Entries: {}", total);
    println!("  Database: {} ({} bytes)", db_path.display(), size_bytes);

    if !events.is_empty() {
        println!();
        let mut table = create_table();
        table.set_header(vec!["Event", "Count"]);
        for event in &events {
            table.add_row(vec![event.event.clone(), event.count.to_string()]);
        }
        println!("{}", table);
    }
    Ok(())
}
