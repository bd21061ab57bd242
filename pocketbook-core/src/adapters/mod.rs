//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - DuckDB for the RecordStore port (local, on-device)
//! - PostgREST-style HTTP client for the RemoteTable port
//! - MirroredStore, a RecordStore that prefers the remote and falls back to DuckDB
//! - Environment variables and a JSON-lines file for the HostBridge port

pub mod duckdb;
pub mod host;
pub mod mirrored;
pub mod rest;

#[cfg(test)]
pub mod rest_mock;

pub use self::duckdb::DuckDbStore;
pub use host::{EnvHostBridge, HOST_USER_ID_VAR};
pub use mirrored::MirroredStore;
pub use rest::RestRemote;
