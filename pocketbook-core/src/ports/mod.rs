//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The core domain
//! depends only on these traits, not on concrete implementations.

mod host;
mod record_store;
mod remote;

pub use host::{HostBridge, HostEvent};
pub use record_store::{RecordStore, RecordStoreExt};
pub use remote::RemoteTable;
