//! Recurring item domain model
//!
//! Recurring items are declarative reminders. Nothing schedules them or turns
//! them into ledger records.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::entity::{new_id, Entity};
use super::result::Error;

/// Direction of a recurring item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowKind {
    Expense,
    Income,
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowKind::Expense => f.write_str("expense"),
            FlowKind::Income => f.write_str("income"),
        }
    }
}

impl FromStr for FlowKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "expense" => Ok(FlowKind::Expense),
            "income" => Ok(FlowKind::Income),
            other => Err(Error::validation(format!("unknown type '{}'", other))),
        }
    }
}

/// How often a recurring item repeats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    Daily,
    Weekly,
    Monthly,
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interval::Daily => f.write_str("daily"),
            Interval::Weekly => f.write_str("weekly"),
            Interval::Monthly => f.write_str("monthly"),
        }
    }
}

impl FromStr for Interval {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Interval::Daily),
            "weekly" => Ok(Interval::Weekly),
            "monthly" => Ok(Interval::Monthly),
            other => Err(Error::validation(format!("unknown interval '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringItem {
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub name: String,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: FlowKind,
    pub interval: Interval,
    pub created_at: DateTime<Utc>,
}

impl RecurringItem {
    pub fn new(
        user_id: impl Into<String>,
        name: impl Into<String>,
        amount: Decimal,
        kind: FlowKind,
        interval: Interval,
    ) -> Self {
        Self {
            id: new_id("rec"),
            user_id: user_id.into(),
            name: name.into(),
            amount,
            kind,
            interval,
            created_at: Utc::now(),
        }
    }
}

impl Entity for RecurringItem {
    fn id(&self) -> &str {
        &self.id
    }

    fn user_id(&self) -> &str {
        &self.user_id
    }
}
