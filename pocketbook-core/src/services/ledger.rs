//! Ledger service - expenses, income and sales

use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::json;

use crate::domain::input::RecordForm;
use crate::domain::{Record, RecordKind, Session};
use crate::ports::{RecordStore, RecordStoreExt};

use super::notifier::Notifier;

pub struct LedgerService {
    store: Arc<dyn RecordStore>,
    notifier: Notifier,
}

impl LedgerService {
    pub fn new(store: Arc<dyn RecordStore>, notifier: Notifier) -> Self {
        Self { store, notifier }
    }

    /// Validate a form and persist the resulting record
    ///
    /// A rejected form is returned as an error wrapping [`crate::Rejection`]
    /// and nothing is written.
    pub async fn add(&self, session: &Session, kind: RecordKind, form: &RecordForm) -> Result<Record> {
        let record = form.validate(kind, session.user_id())?;
        self.store
            .put_entity(kind.table(), &record)
            .await
            .with_context(|| format!("Failed to save {}", kind))?;

        self.notifier.log_table("record_saved", kind.table());
        self.notifier.notify(
            &format!("{}_added", kind),
            json!({
                "id": record.id,
                "amount": record.amount,
                "date": record.date,
                "category": record.category,
            }),
        );
        Ok(record)
    }

    /// Every record of this kind owned by the session user, unordered
    pub async fn snapshot(&self, session: &Session, kind: RecordKind) -> Result<Vec<Record>> {
        let records = self
            .store
            .get_entities::<Record>(kind.table(), session.user_id())
            .await
            .with_context(|| format!("Failed to read {}", kind.table()))?;
        Ok(records)
    }

    /// Records newest first (by date, then creation time), optionally truncated
    pub async fn list(
        &self,
        session: &Session,
        kind: RecordKind,
        limit: Option<usize>,
    ) -> Result<Vec<Record>> {
        let mut records = self.snapshot(session, kind).await?;
        records.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
        if let Some(limit) = limit {
            records.truncate(limit);
        }
        Ok(records)
    }

    /// Delete one of the session user's records
    ///
    /// Returns false when no such record exists for this user.
    pub async fn delete(&self, session: &Session, kind: RecordKind, id: &str) -> Result<bool> {
        let owned = self.snapshot(session, kind).await?.iter().any(|r| r.id == id);
        if !owned {
            return Ok(false);
        }
        self.store
            .delete(kind.table(), id)
            .await
            .with_context(|| format!("Failed to delete {} '{}'", kind, id))?;
        self.notifier.log_table("record_deleted", kind.table());
        Ok(true)
    }
}
