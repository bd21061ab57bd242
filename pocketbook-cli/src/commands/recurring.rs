//! Recurring command - reminders for regular payments and income

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use comfy_table::Cell;
use pocketbook_core::{LogEvent, RecurringForm};

use super::{get_context, get_logger, log_event, value_or_prompt};
use crate::output::{self, create_table, format_money, money_cell};

#[derive(Subcommand)]
pub enum RecurringCommands {
    /// Add a recurring item
    Add {
        name: Option<String>,
        /// Amount per occurrence
        #[arg(long)]
        amount: Option<String>,
        /// expense or income
        #[arg(long = "type", default_value = "expense")]
        kind: String,
        /// daily, weekly or monthly
        #[arg(long, default_value = "monthly")]
        interval: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List recurring items in creation order
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a recurring item by id
    Delete {
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn run(command: RecurringCommands) -> Result<()> {
    let logger = get_logger();
    log_event(&logger, LogEvent::new("command_executed").with_command("recurring"));
    let ctx = get_context(&logger)?;
    let symbol = &ctx.config.currency_symbol;

    match command {
        RecurringCommands::Add {
            name,
            amount,
            kind,
            interval,
            json,
        } => {
            let form = RecurringForm {
                name: value_or_prompt(name, "Name")?,
                amount: value_or_prompt(amount, "Amount")?,
                kind,
                interval,
            };
            let item = ctx.recurring_service.add(&ctx.session, &form).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&item)?);
            } else {
                output::success(&format!(
                    "Added {} {} {} ({})",
                    item.interval,
                    item.kind,
                    item.name,
                    format_money(item.amount, symbol)
                ));
            }
        }
        RecurringCommands::List { json } => {
            let items = ctx.recurring_service.list(&ctx.session).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&items)?);
                return Ok(());
            }

            if items.is_empty() {
                println!("No recurring items.");
                return Ok(());
            }

            let mut table = create_table();
            table.set_header(vec!["Name", "Amount", "Type", "Interval", "ID"]);
            for item in &items {
                table.add_row(vec![
                    Cell::new(&item.name),
                    money_cell(item.amount, symbol),
                    Cell::new(item.kind),
                    Cell::new(item.interval),
                    Cell::new(item.id.dimmed()),
                ]);
            }
            println!("{}", table);
        }
        RecurringCommands::Delete { id, json } => {
            let deleted = ctx.recurring_service.delete(&ctx.session, &id).await?;

            if json {
                println!("{}", serde_json::json!({ "deleted": deleted, "id": id }));
            } else if deleted {
                output::success(&format!("Deleted recurring item {}", id));
            } else {
                output::warning(&format!("No recurring item with id {}", id));
            }
        }
    }

    Ok(())
}
