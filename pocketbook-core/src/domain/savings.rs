//! Savings entries and the per-user monthly budget setting

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::entity::{new_id, Entity};

/// A savings contribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsEntry {
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SavingsEntry {
    pub fn new(user_id: impl Into<String>, amount: Decimal, note: Option<String>) -> Self {
        Self {
            id: new_id("sav"),
            user_id: user_id.into(),
            amount,
            note,
            created_at: Utc::now(),
        }
    }
}

impl Entity for SavingsEntry {
    fn id(&self) -> &str {
        &self.id
    }

    fn user_id(&self) -> &str {
        &self.user_id
    }
}

/// Monthly budget, one per user, keyed by `<userId>_budget`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetSetting {
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub amount: Decimal,
    pub updated_at: DateTime<Utc>,
}

impl BudgetSetting {
    pub fn new(user_id: impl Into<String>, amount: Decimal) -> Self {
        let user_id = user_id.into();
        Self {
            id: budget_id(&user_id),
            user_id,
            amount,
            updated_at: Utc::now(),
        }
    }
}

impl Entity for BudgetSetting {
    fn id(&self) -> &str {
        &self.id
    }

    fn user_id(&self) -> &str {
        &self.user_id
    }
}

/// Deterministic key of a user's budget row
pub fn budget_id(user_id: &str) -> String {
    format!("{}_budget", user_id)
}
