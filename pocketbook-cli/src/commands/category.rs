//! Category command - manage spending categories

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use comfy_table::Cell;
use pocketbook_core::{CategoryForm, LogEvent};

use super::{get_context, get_logger, log_event, value_or_prompt};
use crate::output::{self, create_table};

#[derive(Subcommand)]
pub enum CategoryCommands {
    /// Add a category
    Add {
        name: Option<String>,
        /// Color as #rrggbb
        #[arg(long, default_value = "#94a3b8")]
        color: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List categories, seeding the defaults on first use
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a category; records keep the dangling id
    Delete {
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn run(command: CategoryCommands) -> Result<()> {
    let logger = get_logger();
    log_event(&logger, LogEvent::new("command_executed").with_command("category"));
    let ctx = get_context(&logger)?;

    match command {
        CategoryCommands::Add { name, color, json } => {
            let form = CategoryForm {
                name: value_or_prompt(name, "Name")?,
                color,
            };
            let category = ctx.category_service.add(&ctx.session, &form).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&category)?);
            } else {
                output::success(&format!("Added category {} ({})", category.name, category.id));
            }
        }
        CategoryCommands::List { json } => {
            let seeded = ctx.category_service.ensure_defaults(&ctx.session).await?;
            let categories = ctx.category_service.list(&ctx.session).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&categories)?);
                return Ok(());
            }

            if !seeded.is_empty() {
                output::info(&format!("Created {} default categories", seeded.len()));
            }

            let mut table = create_table();
            table.set_header(vec!["Name", "Color", "ID"]);
            for category in &categories {
                table.add_row(vec![
                    Cell::new(&category.name),
                    Cell::new(&category.color),
                    Cell::new(category.id.dimmed()),
                ]);
            }
            println!("{}", table);
        }
        CategoryCommands::Delete { id, json } => {
            let deleted = ctx.category_service.delete(&ctx.session, &id).await?;

            if json {
                println!("{}", serde_json::json!({ "deleted": deleted, "id": id }));
            } else if deleted {
                output::success(&format!("Deleted category {}", id));
            } else {
                output::warning(&format!("No category with id {}", id));
            }
        }
    }

    Ok(())
}
