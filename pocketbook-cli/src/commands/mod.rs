//! CLI command implementations

pub mod budget;
pub mod category;
pub mod export;
pub mod logs;
pub mod record;
pub mod recurring;
pub mod report;
pub mod savings;
pub mod status;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use dialoguer::Input;
use pocketbook_core::adapters::{EnvHostBridge, HOST_USER_ID_VAR};
use pocketbook_core::config::{self, Config};
use pocketbook_core::{ContextOptions, EntryPoint, LogEvent, LoggingService, PocketbookContext};

/// Get the pocketbook data directory from environment or default
pub fn get_data_dir() -> Result<PathBuf> {
    config::data_dir()
}

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<Arc<LoggingService>> {
    let data_dir = get_data_dir().ok()?;
    std::fs::create_dir_all(&data_dir).ok()?;
    // Launched by a host application rather than typed by a user
    let entry_point = if std::env::var_os(HOST_USER_ID_VAR).is_some() {
        EntryPoint::Embedded
    } else {
        EntryPoint::Cli
    };
    LoggingService::new(&data_dir, entry_point, env!("CARGO_PKG_VERSION"))
        .ok()
        .map(Arc::new)
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<Arc<LoggingService>>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Build the context for one command, resolving the session user
pub fn get_context(logger: &Option<Arc<LoggingService>>) -> Result<PocketbookContext> {
    let data_dir = get_data_dir()?;
    let config = Config::load(&data_dir)?;
    let options = ContextOptions {
        host: Some(Arc::new(EnvHostBridge::from_env())),
        logger: logger.clone(),
        ..ContextOptions::default()
    };

    PocketbookContext::with_options(&data_dir, config, options)
        .context("Failed to initialize pocketbook context")
}

/// Use the given value, or ask for it when attached to a terminal
pub fn value_or_prompt(value: Option<String>, prompt: &str) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None if atty::is(atty::Stream::Stdin) => Ok(Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?),
        None => Ok(String::new()),
    }
}
