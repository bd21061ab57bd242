//! Remote table port - an optional hosted table-per-entity backend

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::domain::result::Result;
use crate::domain::Table;

/// Hosted table service used as a best-effort mirror
///
/// Tables are provisioned out of band; implementations never create them.
#[async_trait]
pub trait RemoteTable: Send + Sync {
    /// Backend name for diagnostics (e.g., "rest")
    fn name(&self) -> &str;

    /// Insert or merge a document by its `id`
    async fn upsert(&self, table: Table, doc: &JsonValue) -> Result<()>;

    /// All documents whose `userId` equals `user_id`
    async fn select_by_user(&self, table: Table, user_id: &str) -> Result<Vec<JsonValue>>;

    /// Delete a document by `id`
    async fn delete(&self, table: Table, id: &str) -> Result<()>;
}
