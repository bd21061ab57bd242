//! Savings service - savings entries and the monthly budget

use std::sync::Arc;

use anyhow::{Context, Result};
use rust_decimal::Decimal;

use crate::domain::input::{BudgetForm, SavingsForm};
use crate::domain::{budget_id, BudgetSetting, SavingsEntry, Session, Table};
use crate::ports::{RecordStore, RecordStoreExt};

use super::notifier::Notifier;

pub struct SavingsService {
    store: Arc<dyn RecordStore>,
    notifier: Notifier,
}

impl SavingsService {
    pub fn new(store: Arc<dyn RecordStore>, notifier: Notifier) -> Self {
        Self { store, notifier }
    }

    pub async fn add(&self, session: &Session, form: &SavingsForm) -> Result<SavingsEntry> {
        let entry = form.validate(session.user_id())?;
        self.store
            .put_entity(Table::Savings, &entry)
            .await
            .context("Failed to save savings entry")?;
        self.notifier.log_table("record_saved", Table::Savings);
        Ok(entry)
    }

    /// Savings entries, newest first
    pub async fn list(&self, session: &Session) -> Result<Vec<SavingsEntry>> {
        let mut entries = self
            .store
            .get_entities::<SavingsEntry>(Table::Savings, session.user_id())
            .await
            .context("Failed to read savings")?;
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }

    pub async fn total(&self, session: &Session) -> Result<Decimal> {
        self.list(session)
            .await?
            .iter()
            .try_fold(Decimal::ZERO, |acc, e| acc.checked_add(e.amount))
            .context("Savings total is too large to represent")
    }

    pub async fn delete(&self, session: &Session, id: &str) -> Result<bool> {
        let owned = self.list(session).await?.iter().any(|e| e.id == id);
        if !owned {
            return Ok(false);
        }
        self.store
            .delete(Table::Savings, id)
            .await
            .with_context(|| format!("Failed to delete savings entry '{}'", id))?;
        self.notifier.log_table("record_deleted", Table::Savings);
        Ok(true)
    }

    /// Replace the user's monthly budget
    pub async fn set_budget(&self, session: &Session, form: &BudgetForm) -> Result<BudgetSetting> {
        let budget = form.validate(session.user_id())?;
        self.store
            .put_entity(Table::Budgets, &budget)
            .await
            .context("Failed to save budget")?;
        self.notifier.log_table("budget_updated", Table::Budgets);
        Ok(budget)
    }

    pub async fn budget(&self, session: &Session) -> Result<Option<BudgetSetting>> {
        let key = budget_id(session.user_id());
        let budgets = self
            .store
            .get_entities::<BudgetSetting>(Table::Budgets, session.user_id())
            .await
            .context("Failed to read budget")?;
        Ok(budgets.into_iter().find(|b| b.id == key))
    }
}
