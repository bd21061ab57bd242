//! Remote-first record store with local fallback
//!
//! Every operation tries the remote table first. When the remote is absent
//! or fails, the local store takes over and the failure is logged, never
//! returned. Nothing is reconciled afterwards: rows written while the remote
//! was down stay local-only, and reads see whichever backend answered.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::result::Result;
use crate::domain::{StoredRow, Table};
use crate::ports::{RecordStore, RemoteTable};
use crate::services::{LogEvent, LoggingService};

pub struct MirroredStore {
    local: Arc<dyn RecordStore>,
    remote: Option<Arc<dyn RemoteTable>>,
    logger: Option<Arc<LoggingService>>,
}

impl MirroredStore {
    pub fn new(local: Arc<dyn RecordStore>, remote: Option<Arc<dyn RemoteTable>>) -> Self {
        Self {
            local,
            remote,
            logger: None,
        }
    }

    /// Record fallbacks in the structured log as well as on stderr
    pub fn with_logger(mut self, logger: Arc<LoggingService>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Name of the remote backend, if one is configured
    pub fn remote_name(&self) -> Option<&str> {
        self.remote.as_deref().map(|r| r.name())
    }

    fn warn(&self, event: &str, table: Table, message: &str) {
        eprintln!("[pocketbook] {} ({}): {}", event, table, message);
        if let Some(logger) = &self.logger {
            let entry = LogEvent::new(event)
                .with_table(table.as_str())
                .with_error(message);
            if let Err(e) = logger.log(entry) {
                eprintln!("[pocketbook] Failed to write log entry: {}", e);
            }
        }
    }
}

#[async_trait]
impl RecordStore for MirroredStore {
    async fn put(&self, table: Table, row: &StoredRow) -> Result<()> {
        if let Some(remote) = &self.remote {
            match remote.upsert(table, &row.doc).await {
                Ok(()) => return Ok(()),
                Err(e) => self.warn("remote_save_failed", table, &e.to_string()),
            }
        }
        self.local.put(table, row).await
    }

    async fn get_all_by_user(&self, table: Table, user_id: &str) -> Result<Vec<StoredRow>> {
        if let Some(remote) = &self.remote {
            let fetched: Result<Vec<StoredRow>> = remote
                .select_by_user(table, user_id)
                .await
                .and_then(|docs| docs.into_iter().map(StoredRow::from_doc).collect());
            match fetched {
                Ok(rows) => return Ok(rows),
                Err(e) => self.warn("remote_read_failed", table, &e.to_string()),
            }
        }

        match self.local.get_all_by_user(table, user_id).await {
            Ok(rows) => Ok(rows),
            Err(e) => {
                self.warn("local_read_failed", table, &e.to_string());
                Ok(Vec::new())
            }
        }
    }

    async fn delete(&self, table: Table, id: &str) -> Result<()> {
        if let Some(remote) = &self.remote {
            match remote.delete(table, id).await {
                Ok(()) => return Ok(()),
                Err(e) => self.warn("remote_delete_failed", table, &e.to_string()),
            }
        }
        self.local.delete(table, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::DuckDbStore;
    use crate::domain::result::Error;
    use serde_json::{json, Value as JsonValue};
    use std::sync::Mutex;

    /// Remote that either always fails or keeps documents in memory
    struct FakeRemote {
        fail: bool,
        docs: Mutex<Vec<(Table, JsonValue)>>,
    }

    impl FakeRemote {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                fail,
                docs: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl RemoteTable for FakeRemote {
        fn name(&self) -> &str {
            "fake"
        }

        async fn upsert(&self, table: Table, doc: &JsonValue) -> Result<()> {
            if self.fail {
                return Err(Error::remote("offline"));
            }
            let mut docs = self.docs.lock().unwrap();
            docs.retain(|(t, d)| !(*t == table && d["id"] == doc["id"]));
            docs.push((table, doc.clone()));
            Ok(())
        }

        async fn select_by_user(&self, table: Table, user_id: &str) -> Result<Vec<JsonValue>> {
            if self.fail {
                return Err(Error::remote("offline"));
            }
            let docs = self.docs.lock().unwrap();
            Ok(docs
                .iter()
                .filter(|(t, d)| *t == table && d["userId"] == user_id)
                .map(|(_, d)| d.clone())
                .collect())
        }

        async fn delete(&self, table: Table, id: &str) -> Result<()> {
            if self.fail {
                return Err(Error::remote("offline"));
            }
            self.docs
                .lock()
                .unwrap()
                .retain(|(t, d)| !(*t == table && d["id"] == id));
            Ok(())
        }
    }

    fn local() -> Arc<DuckDbStore> {
        let store = DuckDbStore::open_in_memory().unwrap();
        store.ensure_schema().unwrap();
        Arc::new(store)
    }

    fn row(id: &str, user_id: &str) -> StoredRow {
        StoredRow::from_doc(json!({ "id": id, "userId": user_id, "amount": "10", "date": "2024-05-01" }))
            .unwrap()
    }

    #[tokio::test]
    async fn test_without_remote_uses_local() {
        let local = local();
        let store = MirroredStore::new(local.clone(), None);
        assert_eq!(store.remote_name(), None);

        store.put(Table::Expenses, &row("e1", "u")).await.unwrap();
        assert_eq!(local.get_all_by_user(Table::Expenses, "u").await.unwrap().len(), 1);

        store.delete(Table::Expenses, "e1").await.unwrap();
        assert!(store.get_all_by_user(Table::Expenses, "u").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remote_failure_falls_back_to_local() {
        let local = local();
        let store = MirroredStore::new(local.clone(), Some(FakeRemote::new(true)));

        store.put(Table::Expenses, &row("e1", "u")).await.unwrap();

        let rows = store.get_all_by_user(Table::Expenses, "u").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "e1");
    }

    #[tokio::test]
    async fn test_remote_success_leaves_local_untouched() {
        let local = local();
        let remote = FakeRemote::new(false);
        let store = MirroredStore::new(local.clone(), Some(remote.clone()));
        assert_eq!(store.remote_name(), Some("fake"));

        store.put(Table::Income, &row("i1", "u")).await.unwrap();

        assert!(local.get_all_by_user(Table::Income, "u").await.unwrap().is_empty());
        let rows = store.get_all_by_user(Table::Income, "u").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, chrono::NaiveDate::from_ymd_opt(2024, 5, 1));

        store.delete(Table::Income, "i1").await.unwrap();
        assert!(remote.docs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_local_read_failure_degrades_to_empty() {
        // No schema: every local query fails
        let local = Arc::new(DuckDbStore::open_in_memory().unwrap());
        let store = MirroredStore::new(local, Some(FakeRemote::new(true)));

        let rows = store.get_all_by_user(Table::Sales, "u").await.unwrap();
        assert!(rows.is_empty());

        // Writes still surface storage faults
        assert!(store.put(Table::Sales, &row("s1", "u")).await.is_err());
    }
}
