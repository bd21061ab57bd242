//! Recurring service - declarative repeating items

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::domain::input::RecurringForm;
use crate::domain::{RecurringItem, Session, Table};
use crate::ports::{RecordStore, RecordStoreExt};

use super::notifier::Notifier;

pub struct RecurringService {
    store: Arc<dyn RecordStore>,
    notifier: Notifier,
}

impl RecurringService {
    pub fn new(store: Arc<dyn RecordStore>, notifier: Notifier) -> Self {
        Self { store, notifier }
    }

    pub async fn add(&self, session: &Session, form: &RecurringForm) -> Result<RecurringItem> {
        let item = form.validate(session.user_id())?;
        self.store
            .put_entity(Table::Recurring, &item)
            .await
            .context("Failed to save recurring item")?;
        self.notifier.log_table("record_saved", Table::Recurring);
        Ok(item)
    }

    /// Items in creation order
    pub async fn list(&self, session: &Session) -> Result<Vec<RecurringItem>> {
        let mut items = self
            .store
            .get_entities::<RecurringItem>(Table::Recurring, session.user_id())
            .await
            .context("Failed to read recurring items")?;
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(items)
    }

    pub async fn delete(&self, session: &Session, id: &str) -> Result<bool> {
        let owned = self.list(session).await?.iter().any(|i| i.id == id);
        if !owned {
            return Ok(false);
        }
        self.store
            .delete(Table::Recurring, id)
            .await
            .with_context(|| format!("Failed to delete recurring item '{}'", id))?;
        self.notifier.log_table("record_deleted", Table::Recurring);
        Ok(true)
    }
}
