//! Derived metrics over a snapshot of records
//!
//! Everything here is a pure function of its inputs. Results never depend on
//! the order records arrive in: groupings are keyed maps and outputs are
//! sorted by key.
//!
//! Amounts are added with checked arithmetic. Rows read back from a remote
//! table never passed the input boundary, so a total that leaves the
//! `Decimal` range is reported as [`Error::Overflow`].

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::result::{Error, Result};
use crate::domain::{Category, Record};

/// Label shown for records without a category
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Days the naive forecast projects over
pub const FORECAST_DAYS: i64 = 30;

/// Longest daily series, in days (about ten years)
pub const MAX_SERIES_DAYS: u32 = 3660;

/// One point of a dense time series
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    /// `YYYY-MM-DD` for daily series, `YYYY-MM` for monthly series
    pub key: String,
    pub total: Decimal,
}

/// Summed amount for one category id
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    /// Empty for uncategorized records
    pub category_id: String,
    /// Category name, or the raw id when the category no longer exists
    pub label: String,
    pub color: Option<String>,
    pub total: Decimal,
}

/// Headline numbers of the budget panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub mean_expense: Decimal,
    pub balance: Decimal,
    pub monthly_budget: Option<Decimal>,
}

fn overflow() -> Error {
    Error::overflow("amount total is too large to represent")
}

fn add_to(slot: &mut Decimal, amount: Decimal) -> Result<()> {
    *slot = slot.checked_add(amount).ok_or_else(overflow)?;
    Ok(())
}

fn total(mut amounts: impl Iterator<Item = Decimal>) -> Result<Decimal> {
    amounts.try_fold(Decimal::ZERO, |acc, amount| {
        acc.checked_add(amount).ok_or_else(overflow)
    })
}

fn within(record: &Record, start: NaiveDate, end: NaiveDate) -> bool {
    record.date >= start && record.date <= end
}

pub fn sum(records: &[Record]) -> Result<Decimal> {
    total(records.iter().map(|r| r.amount))
}

/// Total of records dated within `start..=end`
pub fn sum_between(records: &[Record], start: NaiveDate, end: NaiveDate) -> Result<Decimal> {
    total(
        records
            .iter()
            .filter(|r| within(r, start, end))
            .map(|r| r.amount),
    )
}

/// Average amount, zero for an empty set
pub fn mean(records: &[Record]) -> Result<Decimal> {
    if records.is_empty() {
        return Ok(Decimal::ZERO);
    }
    sum(records)?
        .checked_div(Decimal::from(records.len()))
        .ok_or_else(overflow)
}

/// Per-category totals joined against the category list, sorted by category id
pub fn sum_by_category(records: &[Record], categories: &[Category]) -> Result<Vec<CategoryTotal>> {
    let mut totals: BTreeMap<&str, Decimal> = BTreeMap::new();
    for record in records {
        let key = record.category.as_deref().unwrap_or("");
        add_to(totals.entry(key).or_insert(Decimal::ZERO), record.amount)?;
    }

    Ok(totals
        .into_iter()
        .map(|(id, total)| {
            let category = categories.iter().find(|c| c.id == id);
            let label = match (id, category) {
                ("", _) => UNCATEGORIZED.to_string(),
                (_, Some(c)) => c.name.clone(),
                (raw, None) => raw.to_string(),
            };
            CategoryTotal {
                category_id: id.to_string(),
                label,
                color: category.map(|c| c.color.clone()),
                total,
            }
        })
        .collect())
}

/// One bucket per calendar day in `start..=end`, zero-filled
///
/// An inverted window yields no buckets. Windows longer than
/// [`MAX_SERIES_DAYS`] are refused.
pub fn daily_series(records: &[Record], start: NaiveDate, end: NaiveDate) -> Result<Vec<Bucket>> {
    if (end - start).num_days() >= i64::from(MAX_SERIES_DAYS) {
        return Err(Error::validation(format!(
            "a daily series covers at most {} days",
            MAX_SERIES_DAYS
        )));
    }

    let mut totals: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for record in records.iter().filter(|r| within(r, start, end)) {
        add_to(totals.entry(record.date).or_insert(Decimal::ZERO), record.amount)?;
    }

    Ok(start
        .iter_days()
        .take_while(|day| *day <= end)
        .map(|day| Bucket {
            key: day.format("%Y-%m-%d").to_string(),
            total: totals.get(&day).copied().unwrap_or(Decimal::ZERO),
        })
        .collect())
}

/// Exactly `days` daily buckets ending at `end`
pub fn last_n_days(records: &[Record], end: NaiveDate, days: u32) -> Result<Vec<Bucket>> {
    if days == 0 {
        return Ok(Vec::new());
    }
    if days > MAX_SERIES_DAYS {
        return Err(Error::validation(format!(
            "a daily series covers at most {} days",
            MAX_SERIES_DAYS
        )));
    }
    let start = end
        .checked_sub_signed(Duration::days(i64::from(days) - 1))
        .ok_or_else(|| Error::validation(format!("{} days before {} is out of range", days, end)))?;
    daily_series(records, start, end)
}

fn month_key(year: i32, month: u32) -> String {
    format!("{:04}-{:02}", year, month)
}

/// One bucket per calendar month from the month of `start` to the month of `end`
pub fn monthly_series(records: &[Record], start: NaiveDate, end: NaiveDate) -> Result<Vec<Bucket>> {
    let first = (start.year(), start.month());
    let last = (end.year(), end.month());

    let mut totals: BTreeMap<(i32, u32), Decimal> = BTreeMap::new();
    for record in records {
        let key = (record.date.year(), record.date.month());
        if key >= first && key <= last {
            add_to(totals.entry(key).or_insert(Decimal::ZERO), record.amount)?;
        }
    }

    let mut buckets = Vec::new();
    let (mut year, mut month) = first;
    while (year, month) <= last {
        buckets.push(Bucket {
            key: month_key(year, month),
            total: totals.get(&(year, month)).copied().unwrap_or(Decimal::ZERO),
        });
        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
    }
    Ok(buckets)
}

/// Dense monthly series spanning the earliest to the latest record
pub fn monthly_series_span(records: &[Record]) -> Result<Vec<Bucket>> {
    let first = records.iter().map(|r| r.date).min();
    let last = records.iter().map(|r| r.date).max();
    match (first, last) {
        (Some(start), Some(end)) => monthly_series(records, start, end),
        _ => Ok(Vec::new()),
    }
}

/// Demo heuristic: the mean amount times thirty days
///
/// Not a statistical forecast; shown to users with that label.
pub fn naive_forecast(records: &[Record]) -> Result<Decimal> {
    mean(records)?
        .checked_mul(Decimal::from(FORECAST_DAYS))
        .ok_or_else(overflow)
}

fn summary_of(
    total_income: Decimal,
    total_expenses: Decimal,
    mean_expense: Decimal,
    monthly_budget: Option<Decimal>,
) -> Result<Summary> {
    Ok(Summary {
        total_income,
        total_expenses,
        mean_expense,
        balance: total_income.checked_sub(total_expenses).ok_or_else(overflow)?,
        monthly_budget,
    })
}

pub fn summarize(
    expenses: &[Record],
    income: &[Record],
    monthly_budget: Option<Decimal>,
) -> Result<Summary> {
    summary_of(sum(income)?, sum(expenses)?, mean(expenses)?, monthly_budget)
}

/// Summary restricted to records dated within `start..=end`
pub fn summarize_between(
    expenses: &[Record],
    income: &[Record],
    monthly_budget: Option<Decimal>,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Summary> {
    let in_window: Vec<Record> = expenses
        .iter()
        .filter(|r| within(r, start, end))
        .cloned()
        .collect();
    summary_of(
        sum_between(income, start, end)?,
        sum_between(expenses, start, end)?,
        mean(&in_window)?,
        monthly_budget,
    )
}
