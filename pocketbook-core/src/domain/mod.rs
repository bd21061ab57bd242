//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

mod category;
mod entity;
pub mod input;
mod record;
mod recurring;
pub mod result;
mod savings;
mod session;
mod table;

pub use category::{Category, DEFAULT_CATEGORIES};
pub use entity::{new_id, Entity, StoredRow};
pub use input::Rejection;
pub use record::{Record, RecordKind};
pub use recurring::{FlowKind, Interval, RecurringItem};
pub use savings::{budget_id, BudgetSetting, SavingsEntry};
pub use session::{IdentitySource, Session};
pub use table::Table;
