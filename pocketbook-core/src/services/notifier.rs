//! Side channels of a user action: the event log and the host bridge
//!
//! Neither may fail the action that triggered it. Errors are reported on
//! stderr and dropped.

use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::domain::Table;
use crate::ports::{HostBridge, HostEvent};

use super::logging::{LogEvent, LoggingService};

#[derive(Clone, Default)]
pub struct Notifier {
    bridge: Option<Arc<dyn HostBridge>>,
    logger: Option<Arc<LoggingService>>,
}

impl Notifier {
    pub fn new(bridge: Option<Arc<dyn HostBridge>>, logger: Option<Arc<LoggingService>>) -> Self {
        Self { bridge, logger }
    }

    /// Record a structured log event
    pub fn log(&self, event: LogEvent) {
        if let Some(logger) = &self.logger {
            if let Err(e) = logger.log(event) {
                eprintln!("[pocketbook] Failed to write log entry: {}", e);
            }
        }
    }

    /// Log `event` against `table`
    pub fn log_table(&self, event: &str, table: Table) {
        self.log(LogEvent::new(event).with_table(table.as_str()));
    }

    /// Hand an event to the host, if one is attached
    pub fn notify(&self, kind: &str, data: JsonValue) {
        if let Some(bridge) = &self.bridge {
            if let Err(e) = bridge.notify(&HostEvent::new(kind, data)) {
                eprintln!("[pocketbook] Host notification '{}' failed: {}", kind, e);
                self.log(LogEvent::new("host_notify_failed").with_error(e.to_string()));
            }
        }
    }
}
