//! Savings command - contributions toward savings

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use comfy_table::Cell;
use pocketbook_core::{LogEvent, SavingsForm};

use super::{get_context, get_logger, log_event, value_or_prompt};
use crate::output::{self, create_table, format_money, money_cell};

#[derive(Subcommand)]
pub enum SavingsCommands {
    /// Record a savings contribution
    Add {
        amount: Option<String>,
        #[arg(long, short)]
        note: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List contributions and their total
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a contribution by id
    Delete {
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn run(command: SavingsCommands) -> Result<()> {
    let logger = get_logger();
    log_event(&logger, LogEvent::new("command_executed").with_command("savings"));
    let ctx = get_context(&logger)?;
    let symbol = &ctx.config.currency_symbol;

    match command {
        SavingsCommands::Add { amount, note, json } => {
            let form = SavingsForm {
                amount: value_or_prompt(amount, "Amount")?,
                note,
            };
            let entry = ctx.savings_service.add(&ctx.session, &form).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&entry)?);
            } else {
                output::success(&format!("Saved {}", format_money(entry.amount, symbol)));
            }
        }
        SavingsCommands::List { json } => {
            let entries = ctx.savings_service.list(&ctx.session).await?;
            let total = ctx.savings_service.total(&ctx.session).await?;

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "entries": entries,
                        "total": total,
                    }))?
                );
                return Ok(());
            }

            if entries.is_empty() {
                println!("No savings yet.");
                return Ok(());
            }

            let mut table = create_table();
            table.set_header(vec!["Created", "Amount", "Note", "ID"]);
            for entry in &entries {
                table.add_row(vec![
                    Cell::new(entry.created_at.format("%Y-%m-%d")),
                    money_cell(entry.amount, symbol),
                    Cell::new(entry.note.as_deref().unwrap_or("")),
                    Cell::new(entry.id.dimmed()),
                ]);
            }
            println!("{}", table);
            println!("{} {}", "Total:".bold(), format_money(total, symbol));
        }
        SavingsCommands::Delete { id, json } => {
            let deleted = ctx.savings_service.delete(&ctx.session, &id).await?;

            if json {
                println!("{}", serde_json::json!({ "deleted": deleted, "id": id }));
            } else if deleted {
                output::success(&format!("Deleted savings entry {}", id));
            } else {
                output::warning(&format!("No savings entry with id {}", id));
            }
        }
    }

    Ok(())
}
