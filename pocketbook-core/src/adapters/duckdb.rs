//! DuckDB record store implementation

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use duckdb::{params, Connection};

use crate::domain::result::{Error, Result};
use crate::domain::{StoredRow, Table};
use crate::ports::RecordStore;
use crate::services::{MigrationResult, MigrationService};

/// Maximum number of retries when the database file is locked at open
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

/// Check if an error message indicates a file locking issue that should be retried
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("file is already open")
}

/// Local on-device record store
///
/// One table per entity kind, keyed by `id`, with an index on `user_id`.
/// Each `put` runs in its own transaction so a failed write leaves nothing behind.
pub struct DuckDbStore {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl DuckDbStore {
    /// Open (or create) the store at `db_path`
    ///
    /// Retries with exponential backoff while another process holds the file.
    /// Only opening is retried; individual reads and writes never are.
    pub fn new(db_path: &Path) -> anyhow::Result<Self> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match Self::try_open_connection(db_path) {
                Ok(conn) => {
                    return Ok(Self {
                        conn: Mutex::new(conn),
                        db_path: Some(db_path.to_path_buf()),
                    });
                }
                Err(e) => {
                    let err_msg = e.to_string();
                    if is_retryable_error(&err_msg) && attempt < MAX_RETRIES - 1 {
                        let delay =
                            Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
                        eprintln!(
                            "[pocketbook] Database busy, retrying in {}ms (attempt {}/{}): {}",
                            delay.as_millis(),
                            attempt + 1,
                            MAX_RETRIES,
                            err_msg
                        );
                        thread::sleep(delay);
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }

        Err(last_error
            .map(anyhow::Error::from)
            .unwrap_or_else(|| anyhow!("Failed to open database after {} retries", MAX_RETRIES)))
    }

    /// In-memory store, used by tests and throwaway sessions
    pub fn open_in_memory() -> anyhow::Result<Self> {
        Ok(Self {
            conn: Mutex::new(Connection::open_in_memory()?),
            db_path: None,
        })
    }

    fn try_open_connection(db_path: &Path) -> duckdb::Result<Connection> {
        // Extension autoloading stays off; JSON is linked in via the "json" feature
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        Connection::open_with_flags(db_path, config)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| Error::storage(format!("Lock poisoned: {}", e)))
    }

    /// Run pending migrations, creating tables and indexes on first use
    pub fn run_migrations(&self) -> anyhow::Result<MigrationResult> {
        let conn = self.lock()?;
        MigrationService::new(&conn).run_pending()
    }

    /// Ensure database schema exists (runs pending migrations)
    pub fn ensure_schema(&self) -> anyhow::Result<()> {
        self.run_migrations()?;
        Ok(())
    }

    /// Integer schema version
    pub fn schema_version(&self) -> anyhow::Result<u32> {
        let conn = self.lock()?;
        MigrationService::new(&conn).schema_version()
    }

    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Number of locally stored rows one user owns in a table
    pub fn count_for_user(&self, table: Table, user_id: &str) -> Result<i64> {
        let conn = self.lock()?;
        let count = conn.query_row(
            &format!("SELECT COUNT(*) FROM {} WHERE user_id = ?", table),
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

type RawRow = (String, String, Option<String>, String);

fn read_row(row: &duckdb::Row) -> duckdb::Result<RawRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn parse_row((id, user_id, date, doc): RawRow) -> Result<StoredRow> {
    let doc = serde_json::from_str(&doc)
        .map_err(|e| Error::storage(format!("corrupt document '{}': {}", id, e)))?;
    Ok(StoredRow {
        id,
        user_id,
        date: date.and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
        doc,
    })
}

#[async_trait]
impl RecordStore for DuckDbStore {
    async fn put(&self, table: Table, row: &StoredRow) -> Result<()> {
        let doc = serde_json::to_string(&row.doc)?;
        let date = row.date.map(|d| d.format("%Y-%m-%d").to_string());

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        // Ownership never moves: the id of one user's row cannot be claimed by another
        let owner: Option<String> = match tx.query_row(
            &format!("SELECT user_id FROM {} WHERE id = ?", table),
            params![row.id],
            |r| r.get(0),
        ) {
            Ok(owner) => Some(owner),
            Err(duckdb::Error::QueryReturnedNoRows) => None,
            Err(e) => return Err(e.into()),
        };
        if let Some(owner) = owner {
            if owner != row.user_id {
                return Err(Error::storage(format!(
                    "{} row '{}' belongs to another user",
                    table, row.id
                )));
            }
        }

        // user_id is indexed and never updated, so only the other columns are replaced
        tx.execute(
            &format!(
                "INSERT INTO {} (id, user_id, record_date, doc, updated_at)
                 VALUES (?, ?, ?::DATE, ?, ?)
                 ON CONFLICT (id) DO UPDATE SET
                    record_date = EXCLUDED.record_date,
                    doc = EXCLUDED.doc,
                    updated_at = EXCLUDED.updated_at",
                table
            ),
            params![row.id, row.user_id, date, doc, Utc::now().to_rfc3339()],
        )?;

        tx.commit()?;
        Ok(())
    }

    async fn get_all_by_user(&self, table: Table, user_id: &str) -> Result<Vec<StoredRow>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT id, user_id, record_date::VARCHAR, doc FROM {} WHERE user_id = ?",
            table
        ))?;

        let rows = stmt.query_map(params![user_id], read_row)?;

        let mut result = Vec::new();
        for row in rows {
            result.push(parse_row(row?)?);
        }
        Ok(result)
    }

    async fn delete(&self, table: Table, id: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(&format!("DELETE FROM {} WHERE id = ?", table), params![id])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> DuckDbStore {
        let store = DuckDbStore::open_in_memory().unwrap();
        store.ensure_schema().unwrap();
        store
    }

    fn row(id: &str, user_id: &str, date: Option<&str>, amount: &str) -> StoredRow {
        let mut doc = json!({ "id": id, "userId": user_id, "amount": amount });
        if let Some(d) = date {
            doc["date"] = json!(d);
        }
        StoredRow::from_doc(doc).unwrap()
    }

    #[test]
    fn test_retryable_errors() {
        assert!(is_retryable_error("IO Error: Could not set lock on file: database is locked"));
        assert!(!is_retryable_error("Catalog Error: Table does not exist"));
    }

    #[tokio::test]
    async fn test_put_replaces_by_id() {
        let store = store();
        store.put(Table::Expenses, &row("exp_1", "u1", Some("2024-03-01"), "450")).await.unwrap();
        store.put(Table::Expenses, &row("exp_1", "u1", Some("2024-03-02"), "500")).await.unwrap();

        let rows = store.get_all_by_user(Table::Expenses, "u1").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].doc["amount"], "500");
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2024, 3, 2));
    }

    #[tokio::test]
    async fn test_put_rejects_foreign_owner() {
        let store = store();
        store.put(Table::Categories, &row("cat_1", "u1", None, "0")).await.unwrap();

        let result = store.put(Table::Categories, &row("cat_1", "u2", None, "0")).await;
        assert!(matches!(result, Err(Error::Storage(_))));

        // The original row is untouched
        let rows = store.get_all_by_user(Table::Categories, "u1").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!(store.get_all_by_user(Table::Categories, "u2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_moves_record_date() {
        let store = store();
        store.put(Table::Sales, &row("s1", "u", Some("2024-01-31"), "1")).await.unwrap();
        store.put(Table::Sales, &row("s1", "u", Some("2024-02-01"), "2")).await.unwrap();

        let rows = store.get_all_by_user(Table::Sales, "u").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(rows[0].doc["amount"], "2");
    }

    #[tokio::test]
    async fn test_count() {
        let store = store();
        store.put(Table::Income, &row("i1", "a", Some("2024-01-01"), "1")).await.unwrap();
        store.put(Table::Income, &row("i2", "b", Some("2024-01-01"), "1")).await.unwrap();
        assert_eq!(store.count_for_user(Table::Income, "a").unwrap(), 1);
        assert_eq!(store.count_for_user(Table::Income, "c").unwrap(), 0);
        assert_eq!(store.count_for_user(Table::Sales, "a").unwrap(), 0);
    }
}
