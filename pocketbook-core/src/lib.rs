//! Pocketbook Core - expense, income and sales tracking
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core entities (Record, Category, SavingsEntry, ...) and the input boundary
//! - **ports**: Trait definitions for external dependencies (RecordStore, RemoteTable, HostBridge)
//! - **services**: Business logic orchestration
//! - **adapters**: Concrete implementations (DuckDB, REST mirror, environment host bridge)
//! - **analytics**: Pure aggregation over record snapshots

pub mod adapters;
pub mod analytics;
pub mod config;
pub mod domain;
mod log_migrations;
pub mod migrations;
pub mod ports;
pub mod services;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use adapters::{DuckDbStore, EnvHostBridge, MirroredStore, RestRemote};
use config::Config;
use ports::{HostBridge, RecordStore, RemoteTable};
use services::*;

// Re-export commonly used types at crate root
pub use domain::input::{BudgetForm, CategoryForm, RecordForm, RecurringForm, SavingsForm};
pub use domain::result::{Error, Result as CoreResult};
pub use domain::{
    BudgetSetting, Category, FlowKind, IdentitySource, Interval, Record, RecordKind,
    RecurringItem, Rejection, SavingsEntry, Session, Table,
};
pub use services::{EntryPoint, LogEvent, LoggingService};

/// File name of the local database inside the data directory
pub const DB_FILE_NAME: &str = "pocketbook.duckdb";

/// Optional collaborators of a context
///
/// Anything left as `None` is built from configuration and environment.
#[derive(Default)]
pub struct ContextOptions {
    pub host: Option<Arc<dyn HostBridge>>,
    pub remote: Option<Arc<dyn RemoteTable>>,
    pub logger: Option<Arc<LoggingService>>,
    /// Skip the remote mirror even when one is configured
    pub local_only: bool,
}

/// Main context for Pocketbook operations
///
/// Built once per process: resolves configuration, opens the store, runs
/// migrations and fixes the session user every service call is scoped to.
pub struct PocketbookContext {
    pub data_dir: PathBuf,
    pub config: Config,
    pub session: Session,
    pub local: Arc<DuckDbStore>,
    pub store: Arc<MirroredStore>,
    pub logger: Option<Arc<LoggingService>>,
    pub ledger_service: LedgerService,
    pub category_service: CategoryService,
    pub savings_service: SavingsService,
    pub recurring_service: RecurringService,
    pub report_service: ReportService,
    pub export_service: ExportService,
    pub status_service: StatusService,
}

impl PocketbookContext {
    /// Create a context from settings.json and the process environment
    pub fn new(data_dir: &Path) -> Result<Self> {
        let config = Config::load(data_dir)?;
        let options = ContextOptions {
            host: Some(Arc::new(EnvHostBridge::from_env())),
            ..ContextOptions::default()
        };
        Self::with_options(data_dir, config, options)
    }

    pub fn with_options(data_dir: &Path, mut config: Config, options: ContextOptions) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;

        let local = Arc::new(DuckDbStore::new(&data_dir.join(DB_FILE_NAME))?);
        local.ensure_schema().context("Failed to prepare database schema")?;

        let remote: Option<Arc<dyn RemoteTable>> = match (options.remote, options.local_only) {
            (_, true) => None,
            (Some(remote), false) => Some(remote),
            (None, false) => match config.remote() {
                Some(remote) => Some(Arc::new(
                    RestRemote::new(&remote.url, &remote.anon_key, remote.timeout)
                        .context("Invalid remote configuration")?,
                )),
                None => None,
            },
        };

        let mut mirrored = MirroredStore::new(local.clone(), remote);
        if let Some(logger) = &options.logger {
            mirrored = mirrored.with_logger(logger.clone());
        }
        let store = Arc::new(mirrored);

        let session = IdentityService::new(data_dir).resolve(&mut config, options.host.as_deref())?;

        let notifier = Notifier::new(options.host.clone(), options.logger.clone());
        let shared: Arc<dyn RecordStore> = store.clone();

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            config,
            session,
            local: local.clone(),
            store,
            logger: options.logger,
            ledger_service: LedgerService::new(shared.clone(), notifier.clone()),
            category_service: CategoryService::new(shared.clone(), notifier.clone()),
            savings_service: SavingsService::new(shared.clone(), notifier.clone()),
            recurring_service: RecurringService::new(shared.clone(), notifier.clone()),
            report_service: ReportService::new(shared.clone()),
            export_service: ExportService::new(shared, notifier),
            status_service: StatusService::new(local),
        })
    }

    /// Status of the local store plus the configured mirror
    pub fn status(&self) -> Result<StatusSummary> {
        self.status_service
            .get_status(&self.session, self.store.remote_name())
    }
}
