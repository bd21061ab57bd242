//! Report command - summaries and series over the user's records

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Subcommand;
use colored::Colorize;
use comfy_table::Cell;
use pocketbook_core::analytics::{Bucket, FORECAST_DAYS, MAX_SERIES_DAYS};
use pocketbook_core::{LogEvent, RecordKind};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::{get_context, get_logger, log_event};
use crate::output::{create_table, format_money, money_cell};

const BAR_WIDTH: usize = 30;

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Income, expenses, balance and budget
    Summary {
        /// Count records from this day on (YYYY-MM-DD); needs --to
        #[arg(long, requires = "to")]
        from: Option<String>,
        /// Count records up to this day (YYYY-MM-DD); needs --from
        #[arg(long, requires = "from")]
        to: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Totals per category
    Categories {
        /// expense, income or sale
        #[arg(long, default_value = "expense")]
        kind: RecordKind,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// One total per day over the last N days
    Daily {
        #[arg(long, default_value = "expense")]
        kind: RecordKind,
        #[arg(
            long,
            default_value = "30",
            value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_SERIES_DAYS))
        )]
        days: u32,
        /// Last day of the window (YYYY-MM-DD), defaults to today
        #[arg(long)]
        end: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// One total per calendar month
    Monthly {
        #[arg(long, default_value = "expense")]
        kind: RecordKind,
        /// First day of the window (YYYY-MM-DD); needs --to
        #[arg(long, requires = "to")]
        from: Option<String>,
        /// Last day of the window (YYYY-MM-DD); needs --from
        #[arg(long, requires = "from")]
        to: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Sales totals and a naive 30-day projection
    Forecast {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_day(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}'. Use YYYY-MM-DD", raw))
}

fn parse_window(from: Option<String>, to: Option<String>) -> Result<Option<(NaiveDate, NaiveDate)>> {
    match (from, to) {
        (Some(from), Some(to)) => Ok(Some((parse_day(&from)?, parse_day(&to)?))),
        _ => Ok(None),
    }
}

/// Horizontal bar scaled against the largest value
fn bar(value: Decimal, max: Decimal) -> String {
    if max <= Decimal::ZERO || value <= Decimal::ZERO {
        return String::new();
    }
    let ratio = (value / max).to_f64().unwrap_or(0.0);
    let width = ((ratio * BAR_WIDTH as f64).round() as usize).max(1);
    "█".repeat(width)
}

fn print_buckets(buckets: &[Bucket], symbol: &str) {
    let max = buckets.iter().map(|b| b.total).max().unwrap_or(Decimal::ZERO);
    let mut table = create_table();
    table.set_header(vec!["Period", "Total", ""]);
    for bucket in buckets {
        table.add_row(vec![
            Cell::new(&bucket.key),
            money_cell(bucket.total, symbol),
            Cell::new(bar(bucket.total, max).cyan()),
        ]);
    }
    println!("{}", table);
}

pub async fn run(command: ReportCommands) -> Result<()> {
    let logger = get_logger();
    log_event(&logger, LogEvent::new("command_executed").with_command("report"));
    let ctx = get_context(&logger)?;
    let symbol = ctx.config.currency_symbol.as_str();

    match command {
        ReportCommands::Summary { from, to, json } => {
            let window = parse_window(from, to)?;
            let summary = ctx.report_service.summary(&ctx.session, window).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
                return Ok(());
            }

            match window {
                Some((start, end)) => println!("{} {} to {}", "Summary".bold(), start, end),
                None => println!("{}", "Summary".bold()),
            }
            println!();
            let mut table = create_table();
            table.add_row(vec![Cell::new("Income"), money_cell(summary.total_income, symbol)]);
            table.add_row(vec![Cell::new("Expenses"), money_cell(summary.total_expenses, symbol)]);
            table.add_row(vec![Cell::new("Average expense"), money_cell(summary.mean_expense, symbol)]);
            table.add_row(vec![Cell::new("Balance"), money_cell(summary.balance, symbol)]);
            if let Some(budget) = summary.monthly_budget.filter(|b| !b.is_zero()) {
                table.add_row(vec![Cell::new("Monthly budget"), money_cell(budget, symbol)]);
            }
            println!("{}", table);

            if summary.balance < Decimal::ZERO {
                println!(
                    "{}",
                    format!("Spending exceeds income by {}", format_money(-summary.balance, symbol)).yellow()
                );
            }
        }
        ReportCommands::Categories { kind, json } => {
            let totals = ctx.report_service.category_breakdown(&ctx.session, kind).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&totals)?);
                return Ok(());
            }

            if totals.is_empty() {
                println!("No {} records found.", kind);
                return Ok(());
            }

            let max = totals.iter().map(|t| t.total).max().unwrap_or(Decimal::ZERO);
            let mut table = create_table();
            table.set_header(vec!["Category", "Total", ""]);
            for total in &totals {
                table.add_row(vec![
                    Cell::new(&total.label),
                    money_cell(total.total, symbol),
                    Cell::new(bar(total.total, max)),
                ]);
            }
            println!("{}", table);
        }
        ReportCommands::Daily {
            kind,
            days,
            end,
            json,
        } => {
            let end = match end {
                Some(raw) => parse_day(&raw)?,
                None => chrono::Local::now().date_naive(),
            };
            let buckets = ctx.report_service.daily(&ctx.session, kind, end, days).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&buckets)?);
            } else {
                print_buckets(&buckets, symbol);
            }
        }
        ReportCommands::Monthly {
            kind,
            from,
            to,
            json,
        } => {
            let window = parse_window(from, to)?;
            let buckets = ctx.report_service.monthly(&ctx.session, kind, window).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&buckets)?);
            } else if buckets.is_empty() {
                println!("No {} records found.", kind);
            } else {
                print_buckets(&buckets, symbol);
            }
        }
        ReportCommands::Forecast { json } => {
            let forecast = ctx.report_service.sales_forecast(&ctx.session).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&forecast)?);
                return Ok(());
            }

            println!("{}", "Sales".bold());
            println!("  Count: {}", forecast.count);
            println!("  Total: {}", format_money(forecast.total, symbol));
            println!("  Average sale: {}", format_money(forecast.mean, symbol));
            println!(
                "  Next {} days (average × {}): {}",
                FORECAST_DAYS,
                FORECAST_DAYS,
                format_money(forecast.forecast, symbol)
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_scales_to_max() {
        assert_eq!(bar(Decimal::from(10), Decimal::from(10)).chars().count(), BAR_WIDTH);
        assert_eq!(bar(Decimal::from(5), Decimal::from(10)).chars().count(), BAR_WIDTH / 2);
        assert_eq!(bar(Decimal::from(1), Decimal::from(1000)).chars().count(), 1);
        assert!(bar(Decimal::ZERO, Decimal::from(10)).is_empty());
        assert!(bar(Decimal::ONE, Decimal::ZERO).is_empty());
    }

    #[test]
    fn test_parse_day() {
        assert_eq!(parse_day("2024-03-01").unwrap(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert!(parse_day("01.03.2024").is_err());
    }

    #[test]
    fn test_parse_window() {
        let window = parse_window(Some("2024-03-01".into()), Some("2024-03-31".into())).unwrap();
        assert_eq!(
            window,
            Some((
                NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()
            ))
        );
        assert_eq!(parse_window(None, None).unwrap(), None);
        assert!(parse_window(Some("March".into()), Some("2024-03-31".into())).is_err());
    }

    #[test]
    fn test_daily_window_is_bounded() {
        use clap::Parser;

        #[derive(Parser)]
        struct Harness {
            #[command(subcommand)]
            command: ReportCommands,
        }

        assert!(Harness::try_parse_from(["pb", "daily", "--days", "4294967295"]).is_err());
        assert!(Harness::try_parse_from(["pb", "daily", "--days", "0"]).is_err());
        let parsed = Harness::try_parse_from(["pb", "daily", "--days", "3660"]).unwrap();
        assert!(matches!(parsed.command, ReportCommands::Daily { days: 3660, .. }));
    }
}
