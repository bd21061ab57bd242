//! Ledger record domain model (expenses, income, sales)

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::entity::{new_id, Entity};
use super::result::Error;
use super::table::Table;

/// Which ledger a record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Expense,
    Income,
    /// Flat sales list of the simpler tracker
    Sale,
}

impl RecordKind {
    pub fn table(&self) -> Table {
        match self {
            RecordKind::Expense => Table::Expenses,
            RecordKind::Income => Table::Income,
            RecordKind::Sale => Table::Sales,
        }
    }

    fn id_prefix(&self) -> &'static str {
        match self {
            RecordKind::Expense => "exp",
            RecordKind::Income => "inc",
            RecordKind::Sale => "sale",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Expense => "expense",
            RecordKind::Income => "income",
            RecordKind::Sale => "sale",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "expense" | "expenses" => Ok(RecordKind::Expense),
            "income" => Ok(RecordKind::Income),
            "sale" | "sales" => Ok(RecordKind::Sale),
            other => Err(Error::validation(format!("unknown record kind '{}'", other))),
        }
    }
}

/// A single financial event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    /// Category id; may dangle after the category is deleted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Record {
    /// Create a new record with a fresh id
    pub fn new(kind: RecordKind, user_id: impl Into<String>, amount: Decimal, date: NaiveDate) -> Self {
        Self {
            id: new_id(kind.id_prefix()),
            user_id: user_id.into(),
            amount,
            date,
            category: None,
            note: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

impl Entity for Record {
    fn id(&self) -> &str {
        &self.id
    }

    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn date(&self) -> Option<NaiveDate> {
        Some(self.date)
    }
}
