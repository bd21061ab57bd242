//! Migration service - ordered, embedded SQL migrations
//!
//! Both the record database and logs.duckdb use this runner, each with its
//! own list. Applied names are kept in `sys_migrations`; the schema version
//! is how many of them have run.

use anyhow::{Context, Result};
use chrono::Utc;
use duckdb::{params, Connection};

use crate::migrations::MIGRATIONS;

/// (file name, SQL) pairs in application order
pub type Migrations = &'static [(&'static str, &'static str)];

const BOOTSTRAP: &str = "000_migrations.sql";

/// Result of running migrations
#[derive(Debug)]
pub struct MigrationResult {
    /// Names of newly applied migrations
    pub applied: Vec<String>,
    /// Count of migrations that were already applied
    pub already_applied: usize,
}

pub struct MigrationService<'a> {
    conn: &'a Connection,
    migrations: Migrations,
}

impl<'a> MigrationService<'a> {
    /// Runner for the record database schema
    pub fn new(conn: &'a Connection) -> Self {
        Self::with_migrations(conn, MIGRATIONS)
    }

    /// Runner for any other embedded migration list
    pub fn with_migrations(conn: &'a Connection, migrations: Migrations) -> Self {
        Self { conn, migrations }
    }

    /// Apply every migration not yet recorded, bootstrap file first
    pub fn run_pending(&self) -> Result<MigrationResult> {
        let mut newly_applied = Vec::new();

        if !self.migrations_table_exists()? {
            if let Some((name, sql)) = self.migrations.iter().find(|(n, _)| *n == BOOTSTRAP) {
                self.apply(name, sql)?;
                newly_applied.push(name.to_string());
            }
        }

        let applied = self.get_applied()?;
        let already_applied = applied.len() - newly_applied.len();

        for (name, sql) in self.migrations.iter() {
            if *name == BOOTSTRAP || applied.iter().any(|a| a == name) {
                continue;
            }
            self.apply(name, sql)?;
            newly_applied.push(name.to_string());
        }

        Ok(MigrationResult {
            applied: newly_applied,
            already_applied,
        })
    }

    /// Current schema version (count of applied migrations)
    pub fn schema_version(&self) -> Result<u32> {
        if !self.migrations_table_exists()? {
            return Ok(0);
        }
        Ok(self.get_applied()?.len() as u32)
    }

    fn migrations_table_exists(&self) -> Result<bool> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = 'sys_migrations'",
                [],
                |row| row.get(0),
            )
            .unwrap_or(0);
        Ok(count > 0)
    }

    /// Names of applied migrations, sorted
    pub fn get_applied(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT migration_name FROM sys_migrations ORDER BY migration_name")?;
        let names = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut result = Vec::new();
        for name in names {
            result.push(name?);
        }
        Ok(result)
    }

    /// Names of migrations still to run
    pub fn get_pending(&self) -> Result<Vec<String>> {
        let applied = if self.migrations_table_exists()? {
            self.get_applied()?
        } else {
            Vec::new()
        };
        Ok(self
            .migrations
            .iter()
            .filter(|(name, _)| !applied.iter().any(|a| a == name))
            .map(|(name, _)| name.to_string())
            .collect())
    }

    /// Execute one migration and record it, all or nothing
    fn apply(&self, name: &str, sql: &str) -> Result<()> {
        self.conn.execute_batch("BEGIN TRANSACTION")?;

        let outcome = self.conn.execute_batch(sql).and_then(|_| {
            self.conn.execute(
                "INSERT INTO sys_migrations (migration_name, applied_at) VALUES (?, ?)",
                params![name, Utc::now().to_rfc3339()],
            )
        });

        if let Err(e) = outcome {
            let _ = self.conn.execute_batch("ROLLBACK");
            return Err(e).with_context(|| format!("Migration {} failed", name));
        }
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duckdb::Connection;

    #[test]
    fn test_migrations_run_on_fresh_db() {
        let conn = Connection::open_in_memory().unwrap();
        let service = MigrationService::new(&conn);

        let result = service.run_pending().unwrap();

        assert_eq!(result.applied.len(), MIGRATIONS.len());
        assert_eq!(result.already_applied, 0);
        assert_eq!(service.schema_version().unwrap(), MIGRATIONS.len() as u32);

        let again = service.run_pending().unwrap();
        assert!(again.applied.is_empty());
        assert_eq!(again.already_applied, MIGRATIONS.len());
    }

    #[test]
    fn test_separate_lists_share_the_runner() {
        let conn = Connection::open_in_memory().unwrap();
        let service = MigrationService::with_migrations(&conn, crate::log_migrations::LOG_MIGRATIONS);

        let result = service.run_pending().unwrap();
        assert_eq!(result.applied.len(), crate::log_migrations::LOG_MIGRATIONS.len());

        let logs_exists: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = 'sys_logs'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(logs_exists, 1);
    }

    #[test]
    fn test_schema_version_of_empty_db_is_zero() {
        let conn = Connection::open_in_memory().unwrap();
        let service = MigrationService::new(&conn);
        assert_eq!(service.schema_version().unwrap(), 0);
        assert_eq!(service.get_pending().unwrap().len(), MIGRATIONS.len());
    }

    #[test]
    fn test_budget_upgrade_preserves_legacy_rows() {
        let conn = Connection::open_in_memory().unwrap();
        let service = MigrationService::new(&conn);

        // Bring the database to the schema of the first release
        for (name, sql) in &MIGRATIONS[..2] {
            service.apply(name, sql).unwrap();
        }
        conn.execute(
            "INSERT INTO savings (id, user_id, record_date, doc, updated_at) VALUES (?, ?, NULL, ?, ?)",
            params![
                "tg_1_budget",
                "tg_1",
                r#"{"id":"tg_1_budget","userId":"tg_1","amount":"30000","updated_at":"2024-03-01T00:00:00Z"}"#,
                "2024-03-01T00:00:00Z"
            ],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO savings (id, user_id, record_date, doc, updated_at) VALUES (?, ?, NULL, ?, ?)",
            params![
                "sav_1",
                "tg_1",
                r#"{"id":"sav_1","userId":"tg_1","amount":"500","created_at":"2024-03-01T00:00:00Z"}"#,
                "2024-03-01T00:00:00Z"
            ],
        )
        .unwrap();

        let result = service.run_pending().unwrap();
        assert_eq!(result.applied, vec!["002_budget_settings.sql".to_string()]);

        let budgets: i64 = conn
            .query_row("SELECT COUNT(*) FROM budgets WHERE id = 'tg_1_budget'", [], |r| r.get(0))
            .unwrap();
        let savings: Vec<String> = conn
            .prepare("SELECT id FROM savings")
            .unwrap()
            .query_map([], |r| r.get(0))
            .unwrap()
            .map(|r| r.unwrap())
            .collect();

        assert_eq!(budgets, 1);
        assert_eq!(savings, vec!["sav_1".to_string()]);
    }
}
