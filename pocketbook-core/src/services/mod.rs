//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

mod category;
pub mod export;
mod identity;
mod ledger;
pub mod logging;
pub mod migration;
mod notifier;
mod recurring;
mod report;
mod savings;
mod status;

pub use category::CategoryService;
pub use export::{ExportResult, ExportSection, ExportService};
pub use identity::{generate_local_id, IdentityService};
pub use ledger::LedgerService;
pub use logging::{EntryPoint, EventCount, LogEntry, LogEvent, LoggingService};
pub use migration::{MigrationResult, MigrationService};
pub use notifier::Notifier;
pub use recurring::RecurringService;
pub use report::{ReportService, SalesForecast};
pub use savings::SavingsService;
pub use status::{StatusService, StatusSummary, TableCount};
