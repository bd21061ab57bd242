//! Status service - what is stored where, for the session user

use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;

use crate::adapters::DuckDbStore;
use crate::domain::{IdentitySource, Session, Table};

pub struct StatusService {
    local: Arc<DuckDbStore>,
}

impl StatusService {
    pub fn new(local: Arc<DuckDbStore>) -> Self {
        Self { local }
    }

    /// Local row counts and schema details; `remote` names the mirror, if any
    pub fn get_status(&self, session: &Session, remote: Option<&str>) -> Result<StatusSummary> {
        let mut tables = Vec::with_capacity(Table::ALL.len());
        for table in Table::ALL {
            tables.push(TableCount {
                table: table.as_str().to_string(),
                local_rows: self.local.count_for_user(table, session.user_id())?,
            });
        }

        Ok(StatusSummary {
            user_id: session.user_id().to_string(),
            identity_source: session.source(),
            database: self
                .local
                .db_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| ":memory:".to_string()),
            schema_version: self.local.schema_version()?,
            remote: remote.map(str::to_string),
            tables,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct StatusSummary {
    pub user_id: String,
    pub identity_source: IdentitySource,
    pub database: String,
    pub schema_version: u32,
    pub remote: Option<String>,
    pub tables: Vec<TableCount>,
}

#[derive(Debug, Serialize)]
pub struct TableCount {
    pub table: String,
    pub local_rows: i64,
}
