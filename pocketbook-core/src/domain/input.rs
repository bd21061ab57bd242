//! Input boundary - turns untrusted form text into typed entities
//!
//! Nothing reaches the record store without passing through one of these
//! forms. A rejected form carries the reason so the caller can show it.

use std::str::FromStr;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use thiserror::Error;

use super::category::Category;
use super::record::{Record, RecordKind};
use super::recurring::{FlowKind, Interval, RecurringItem};
use super::savings::{BudgetSetting, SavingsEntry};

/// Why a form was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("amount is required")]
    MissingAmount,

    #[error("'{0}' is not a valid amount")]
    InvalidAmount(String),

    #[error("amount must not be negative")]
    NegativeAmount,

    #[error("amount must be greater than zero")]
    ZeroAmount,

    #[error("'{0}' is larger than the accepted maximum of 10^15")]
    AmountTooLarge(String),

    #[error("date is required")]
    MissingDate,

    #[error("'{0}' is not a valid date, use YYYY-MM-DD")]
    InvalidDate(String),

    #[error("name is required")]
    MissingName,

    #[error("'{0}' is not a valid color, use #rrggbb")]
    InvalidColor(String),

    #[error("'{0}' is not a valid type, use expense or income")]
    InvalidKind(String),

    #[error("'{0}' is not a valid interval, use daily, weekly or monthly")]
    InvalidInterval(String),
}

/// Largest amount a form accepts (10^15)
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

fn color_regex() -> &'static Regex {
    static COLOR: OnceLock<Regex> = OnceLock::new();
    COLOR.get_or_init(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("valid color regex"))
}

/// Parse a money amount. Accepts `1 234,50` as well as `1234.50`.
pub fn parse_amount(raw: &str) -> Result<Decimal, Rejection> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Rejection::MissingAmount);
    }

    let normalized: String = trimmed
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    let amount = Decimal::from_str(&normalized)
        .map_err(|_| Rejection::InvalidAmount(trimmed.to_string()))?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(Rejection::NegativeAmount);
    }
    if amount > MAX_AMOUNT {
        return Err(Rejection::AmountTooLarge(trimmed.to_string()));
    }
    Ok(amount)
}

fn parse_positive_amount(raw: &str) -> Result<Decimal, Rejection> {
    let amount = parse_amount(raw)?;
    if amount.is_zero() {
        return Err(Rejection::ZeroAmount);
    }
    Ok(amount)
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(raw: &str) -> Result<NaiveDate, Rejection> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Rejection::MissingDate);
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|_| Rejection::InvalidDate(trimmed.to_string()))
}

/// Fold line breaks into spaces so exported CSV keeps one line per row
fn single_line(raw: &str) -> String {
    raw.trim()
        .split(['\r', '\n'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn non_empty(raw: Option<&str>) -> Option<String> {
    raw.map(single_line).filter(|s| !s.is_empty())
}

/// Raw expense, income or sale form
#[derive(Debug, Clone, Default)]
pub struct RecordForm {
    pub amount: String,
    pub date: String,
    pub category: Option<String>,
    pub note: Option<String>,
}

impl RecordForm {
    pub fn validate(&self, kind: RecordKind, user_id: &str) -> Result<Record, Rejection> {
        let amount = parse_positive_amount(&self.amount)?;
        let date = parse_date(&self.date)?;

        let mut record = Record::new(kind, user_id, amount, date);
        record.category = non_empty(self.category.as_deref());
        record.note = non_empty(self.note.as_deref());
        Ok(record)
    }
}

/// Raw category form
#[derive(Debug, Clone, Default)]
pub struct CategoryForm {
    pub name: String,
    pub color: String,
}

impl CategoryForm {
    pub fn validate(&self, user_id: &str) -> Result<Category, Rejection> {
        let name = single_line(&self.name);
        if name.is_empty() {
            return Err(Rejection::MissingName);
        }
        let color = self.color.trim();
        if !color_regex().is_match(color) {
            return Err(Rejection::InvalidColor(color.to_string()));
        }
        Ok(Category::new(user_id, name, color.to_lowercase()))
    }
}

/// Raw savings form
#[derive(Debug, Clone, Default)]
pub struct SavingsForm {
    pub amount: String,
    pub note: Option<String>,
}

impl SavingsForm {
    pub fn validate(&self, user_id: &str) -> Result<SavingsEntry, Rejection> {
        let amount = parse_positive_amount(&self.amount)?;
        Ok(SavingsEntry::new(user_id, amount, non_empty(self.note.as_deref())))
    }
}

/// Raw monthly budget form; zero clears the budget
#[derive(Debug, Clone, Default)]
pub struct BudgetForm {
    pub amount: String,
}

impl BudgetForm {
    pub fn validate(&self, user_id: &str) -> Result<BudgetSetting, Rejection> {
        let amount = parse_amount(&self.amount)?;
        Ok(BudgetSetting::new(user_id, amount))
    }
}

/// Raw recurring item form
#[derive(Debug, Clone, Default)]
pub struct RecurringForm {
    pub name: String,
    pub amount: String,
    pub kind: String,
    pub interval: String,
}

impl RecurringForm {
    pub fn validate(&self, user_id: &str) -> Result<RecurringItem, Rejection> {
        let name = single_line(&self.name);
        if name.is_empty() {
            return Err(Rejection::MissingName);
        }
        let amount = parse_positive_amount(&self.amount)?;
        let kind = FlowKind::from_str(&self.kind)
            .map_err(|_| Rejection::InvalidKind(self.kind.trim().to_string()))?;
        let interval = Interval::from_str(&self.interval)
            .map_err(|_| Rejection::InvalidInterval(self.interval.trim().to_string()))?;
        Ok(RecurringItem::new(user_id, name, amount, kind, interval))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(amount: &str, date: &str) -> RecordForm {
        RecordForm {
            amount: amount.to_string(),
            date: date.to_string(),
            category: Some("cat_food".to_string()),
            note: Some("  ".to_string()),
        }
    }

    #[test]
    fn test_valid_record_form() {
        let record = form("450", "2024-03-01")
            .validate(RecordKind::Expense, "tg_1")
            .unwrap();

        assert_eq!(record.amount, Decimal::new(450, 0));
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(record.category.as_deref(), Some("cat_food"));
        assert_eq!(record.note, None);
        assert_eq!(record.user_id, "tg_1");
    }

    #[test]
    fn test_record_form_rejections() {
        let user = "u";
        assert_eq!(
            form("", "2024-03-01").validate(RecordKind::Expense, user),
            Err(Rejection::MissingAmount)
        );
        assert_eq!(
            form("abc", "2024-03-01").validate(RecordKind::Expense, user),
            Err(Rejection::InvalidAmount("abc".to_string()))
        );
        assert_eq!(
            form("-5", "2024-03-01").validate(RecordKind::Expense, user),
            Err(Rejection::NegativeAmount)
        );
        assert_eq!(
            form("0", "2024-03-01").validate(RecordKind::Expense, user),
            Err(Rejection::ZeroAmount)
        );
        assert_eq!(
            form("10", "").validate(RecordKind::Expense, user),
            Err(Rejection::MissingDate)
        );
        assert_eq!(
            form("10", "01.03.2024").validate(RecordKind::Expense, user),
            Err(Rejection::InvalidDate("01.03.2024".to_string()))
        );
    }

    #[test]
    fn test_amount_ceiling() {
        assert_eq!(MAX_AMOUNT, Decimal::from(1_000_000_000_000_000i64));
        assert_eq!(parse_amount("1000000000000000").unwrap(), MAX_AMOUNT);
        assert_eq!(
            parse_amount("1000000000000000.01"),
            Err(Rejection::AmountTooLarge("1000000000000000.01".to_string()))
        );

        let max = "79228162514264337593543950335";
        assert_eq!(
            form(max, "2024-03-01").validate(RecordKind::Expense, "u"),
            Err(Rejection::AmountTooLarge(max.to_string()))
        );
        assert!(BudgetForm { amount: max.to_string() }.validate("u").is_err());
    }

    #[test]
    fn test_line_breaks_are_folded() {
        let mut with_note = form("10", "2024-03-01");
        with_note.note = Some("line one\r\nline two\n\nthree".to_string());
        let record = with_note.validate(RecordKind::Expense, "u").unwrap();
        assert_eq!(record.note.as_deref(), Some("line one line two three"));

        let category = CategoryForm {
            name: "Pets\nand vet".to_string(),
            color: "#000000".to_string(),
        }
        .validate("u")
        .unwrap();
        assert_eq!(category.name, "Pets and vet");

        let blank = CategoryForm {
            name: "\n\r\n".to_string(),
            color: "#000000".to_string(),
        };
        assert_eq!(blank.validate("u"), Err(Rejection::MissingName));
    }

    #[test]
    fn test_amount_accepts_comma_and_spaces() {
        assert_eq!(parse_amount("1 234,50").unwrap(), Decimal::new(123450, 2));
        assert_eq!(parse_amount(" 12.5 ").unwrap(), Decimal::new(125, 1));
    }

    #[test]
    fn test_category_form() {
        let category = CategoryForm {
            name: " Pets ".to_string(),
            color: "#A0B1C2".to_string(),
        }
        .validate("u")
        .unwrap();
        assert_eq!(category.name, "Pets");
        assert_eq!(category.color, "#a0b1c2");

        let missing = CategoryForm {
            name: "".to_string(),
            color: "#000000".to_string(),
        };
        assert_eq!(missing.validate("u"), Err(Rejection::MissingName));

        let bad_color = CategoryForm {
            name: "Pets".to_string(),
            color: "red".to_string(),
        };
        assert_eq!(
            bad_color.validate("u"),
            Err(Rejection::InvalidColor("red".to_string()))
        );
    }

    #[test]
    fn test_budget_allows_zero() {
        let budget = BudgetForm {
            amount: "0".to_string(),
        }
        .validate("u")
        .unwrap();
        assert!(budget.amount.is_zero());
        assert_eq!(budget.id, "u_budget");
    }

    #[test]
    fn test_recurring_form() {
        let item = RecurringForm {
            name: "Gym".to_string(),
            amount: "1500".to_string(),
            kind: "expense".to_string(),
            interval: "monthly".to_string(),
        }
        .validate("u")
        .unwrap();
        assert_eq!(item.kind, FlowKind::Expense);
        assert_eq!(item.interval, Interval::Monthly);

        let bad = RecurringForm {
            name: "Gym".to_string(),
            amount: "1500".to_string(),
            kind: "transfer".to_string(),
            interval: "monthly".to_string(),
        };
        assert_eq!(
            bad.validate("u"),
            Err(Rejection::InvalidKind("transfer".to_string()))
        );
    }
}
