//! Budget command - show or set the monthly budget

use anyhow::Result;
use colored::Colorize;
use pocketbook_core::{BudgetForm, LogEvent};

use super::{get_context, get_logger, log_event};
use crate::output::{self, format_money};

/// Show the budget, or set it when an amount is given (0 clears it)
pub async fn run(amount: Option<String>, json: bool) -> Result<()> {
    let logger = get_logger();
    log_event(&logger, LogEvent::new("command_executed").with_command("budget"));
    let ctx = get_context(&logger)?;
    let symbol = &ctx.config.currency_symbol;

    let budget = match amount {
        Some(amount) => {
            let budget = ctx
                .savings_service
                .set_budget(&ctx.session, &BudgetForm { amount })
                .await?;
            if !json {
                output::success(&format!(
                    "Monthly budget set to {}",
                    format_money(budget.amount, symbol)
                ));
            }
            Some(budget)
        }
        None => {
            let budget = ctx.savings_service.budget(&ctx.session).await?;
            if !json {
                match &budget {
                    Some(b) if !b.amount.is_zero() => {
                        println!("{} {}", "Monthly budget:".bold(), format_money(b.amount, symbol))
                    }
                    _ => println!("No monthly budget set."),
                }
            }
            budget
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&budget)?);
    }
    Ok(())
}
