//! Record commands - expenses, income and sales share one shape

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use comfy_table::Cell;
use dialoguer::Confirm;
use pocketbook_core::{Category, LogEvent, PocketbookContext, RecordForm, RecordKind};

use super::{get_context, get_logger, log_event, value_or_prompt};
use crate::output::{self, create_table, format_money, money_cell};

#[derive(Subcommand)]
pub enum RecordCommands {
    /// Add a record
    Add {
        /// Amount, e.g. 450 or "1 234,50"
        amount: Option<String>,
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
        /// Category name or id
        #[arg(long, short)]
        category: Option<String>,
        /// Free-form note
        #[arg(long, short)]
        note: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List records, newest first
    List {
        /// Number of records to show (defaults to the configured list limit)
        #[arg(short, long)]
        limit: Option<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a record by id
    Delete {
        id: String,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn run(kind: RecordKind, command: RecordCommands) -> Result<()> {
    let logger = get_logger();
    log_event(
        &logger,
        LogEvent::new("command_executed").with_command(kind.as_str()),
    );
    let ctx = get_context(&logger)?;

    match command {
        RecordCommands::Add {
            amount,
            date,
            category,
            note,
            json,
        } => run_add(&ctx, kind, amount, date, category, note, json).await,
        RecordCommands::List { limit, json } => run_list(&ctx, kind, limit, json).await,
        RecordCommands::Delete { id, force, json } => run_delete(&ctx, kind, &id, force, json).await,
    }
}

async fn run_add(
    ctx: &PocketbookContext,
    kind: RecordKind,
    amount: Option<String>,
    date: Option<String>,
    category: Option<String>,
    note: Option<String>,
    json: bool,
) -> Result<()> {
    if kind != RecordKind::Sale {
        ctx.category_service.ensure_defaults(&ctx.session).await?;
    }
    let categories = ctx.category_service.list(&ctx.session).await?;

    let form = RecordForm {
        amount: value_or_prompt(amount, "Amount")?,
        date: date.unwrap_or_else(|| chrono::Local::now().date_naive().to_string()),
        category: category
            .map(|c| resolve_category(&categories, &c))
            .transpose()?,
        note,
    };

    let record = ctx.ledger_service.add(&ctx.session, kind, &form).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        output::success(&format!("Added {} {}", kind, record.id));
        println!("  Amount: {}", format_money(record.amount, &ctx.config.currency_symbol));
        println!("  Date: {}", record.date);
        if let Some(category) = &record.category {
            println!("  Category: {}", category_label(&categories, category));
        }
    }

    Ok(())
}

async fn run_list(
    ctx: &PocketbookContext,
    kind: RecordKind,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let limit = limit.unwrap_or(ctx.config.list_limit);
    let records = ctx.ledger_service.list(&ctx.session, kind, Some(limit)).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No {} records found.", kind);
        return Ok(());
    }

    let categories = ctx.category_service.list(&ctx.session).await?;
    let mut table = create_table();
    table.set_header(vec!["Date", "Amount", "Category", "Note", "ID"]);

    for record in &records {
        table.add_row(vec![
            Cell::new(record.date),
            money_cell(record.amount, &ctx.config.currency_symbol),
            Cell::new(
                record
                    .category
                    .as_deref()
                    .map(|c| category_label(&categories, c))
                    .unwrap_or_default(),
            ),
            Cell::new(record.note.as_deref().unwrap_or("")),
            Cell::new(&record.id),
        ]);
    }

    println!("{}", table);
    println!("{}", format!("{} record(s)", records.len()).dimmed());
    Ok(())
}

async fn run_delete(
    ctx: &PocketbookContext,
    kind: RecordKind,
    id: &str,
    force: bool,
    json: bool,
) -> Result<()> {
    if !force && !json && atty::is(atty::Stream::Stdin) {
        if !Confirm::new()
            .with_prompt(format!("Delete {} {}?", kind, id))
            .default(false)
            .interact()?
        {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let deleted = ctx.ledger_service.delete(&ctx.session, kind, id).await?;

    if json {
        println!("{}", serde_json::json!({ "deleted": deleted, "id": id }));
    } else if deleted {
        output::success(&format!("Deleted {} {}", kind, id));
    } else {
        output::warning(&format!("No {} with id {}", kind, id));
    }
    Ok(())
}

/// Match a category by id, then by case-insensitive name
pub fn resolve_category(categories: &[Category], input: &str) -> Result<String> {
    let input = input.trim();
    if let Some(c) = categories.iter().find(|c| c.id == input) {
        return Ok(c.id.clone());
    }
    let wanted = input.to_lowercase();
    categories
        .iter()
        .find(|c| c.name.to_lowercase() == wanted)
        .map(|c| c.id.clone())
        .ok_or_else(|| anyhow::anyhow!("Unknown category '{}'. See `pb category list`.", input))
}

/// Category name for display; a dangling id is shown as is
pub fn category_label(categories: &[Category], id: &str) -> String {
    categories
        .iter()
        .find(|c| c.id == id)
        .map(|c| c.name.clone())
        .unwrap_or_else(|| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories() -> Vec<Category> {
        vec![Category::new("u", "Food", "#f97316"), Category::new("u", "Транспорт", "#60a5fa")]
    }

    #[test]
    fn test_resolve_category_by_name_or_id() {
        let cats = categories();
        assert_eq!(resolve_category(&cats, "food").unwrap(), cats[0].id);
        assert_eq!(resolve_category(&cats, "транспорт").unwrap(), cats[1].id);
        assert_eq!(resolve_category(&cats, &cats[1].id).unwrap(), cats[1].id);
        assert!(resolve_category(&cats, "Rent").is_err());
    }

    #[test]
    fn test_dangling_category_label() {
        let cats = categories();
        assert_eq!(category_label(&cats, &cats[0].id), "Food");
        assert_eq!(category_label(&cats, "cat_gone"), "cat_gone");
    }
}
