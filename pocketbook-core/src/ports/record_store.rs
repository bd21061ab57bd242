//! Record store port - keyed, user-scoped persistence

use async_trait::async_trait;

use crate::domain::result::Result;
use crate::domain::{Entity, StoredRow, Table};

/// Durable per-table storage keyed by row id
///
/// Implementations must scope reads to one user and apply each `put`
/// all-or-nothing. Failures propagate; nothing is retried.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert or replace a row by id. Resolves once the write is durable.
    async fn put(&self, table: Table, row: &StoredRow) -> Result<()>;

    /// All rows owned by `user_id`, in no particular order
    async fn get_all_by_user(&self, table: Table, user_id: &str) -> Result<Vec<StoredRow>>;

    /// Remove a row by id. Deleting a missing id is not an error.
    async fn delete(&self, table: Table, id: &str) -> Result<()>;
}

/// Typed helpers on top of any record store
#[async_trait]
pub trait RecordStoreExt: RecordStore {
    async fn put_entity<E: Entity>(&self, table: Table, entity: &E) -> Result<()> {
        let row = StoredRow::from_entity(entity)?;
        self.put(table, &row).await
    }

    async fn get_entities<E: Entity>(&self, table: Table, user_id: &str) -> Result<Vec<E>> {
        self.get_all_by_user(table, user_id)
            .await?
            .into_iter()
            .map(|row| row.into_entity::<E>())
            .collect()
    }
}

impl<S: RecordStore + ?Sized> RecordStoreExt for S {}
