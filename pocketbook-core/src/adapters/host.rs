//! Host bridge backed by the process environment
//!
//! An embedding host launches the tracker with `POCKETBOOK_HOST_USER_ID`
//! set to its numeric user id and, optionally, `POCKETBOOK_BRIDGE_FILE`
//! pointing at a file it tails for events (one JSON object per line).

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::domain::result::Result;
use crate::ports::{HostBridge, HostEvent};

pub const HOST_USER_ID_VAR: &str = "POCKETBOOK_HOST_USER_ID";
pub const BRIDGE_FILE_VAR: &str = "POCKETBOOK_BRIDGE_FILE";

#[derive(Debug, Clone, Default)]
pub struct EnvHostBridge {
    host_user_id: Option<i64>,
    bridge_file: Option<PathBuf>,
}

impl EnvHostBridge {
    pub fn new(host_user_id: Option<i64>, bridge_file: Option<PathBuf>) -> Self {
        Self {
            host_user_id,
            bridge_file,
        }
    }

    /// Read both variables; a malformed user id is ignored with a warning
    pub fn from_env() -> Self {
        let host_user_id = std::env::var(HOST_USER_ID_VAR)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .and_then(|v| match v.trim().parse::<i64>() {
                Ok(id) => Some(id),
                Err(_) => {
                    eprintln!(
                        "[pocketbook] Ignoring {}: '{}' is not a numeric id",
                        HOST_USER_ID_VAR, v
                    );
                    None
                }
            });
        let bridge_file = std::env::var_os(BRIDGE_FILE_VAR)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        Self::new(host_user_id, bridge_file)
    }

    pub fn bridge_file(&self) -> Option<&Path> {
        self.bridge_file.as_deref()
    }
}

impl HostBridge for EnvHostBridge {
    fn host_user_id(&self) -> Option<i64> {
        self.host_user_id
    }

    fn notify(&self, event: &HostEvent) -> Result<()> {
        let Some(path) = &self.bridge_file else {
            return Ok(());
        };

        let mut line = serde_json::to_string(event)?;
        line.push('\n');

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_notify_appends_json_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bridge.jsonl");
        let bridge = EnvHostBridge::new(Some(42), Some(path.clone()));

        bridge
            .notify(&HostEvent::new("expense_added", json!({ "amount": "450" })))
            .unwrap();
        bridge
            .notify(&HostEvent::new("export_created", json!({ "lines": 3 })))
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: HostEvent = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.kind, "expense_added");
        assert_eq!(first.data["amount"], "450");
        assert!(lines[1].starts_with(r#"{"type":"export_created""#));
    }

    #[test]
    fn test_without_bridge_file_is_silent() {
        let bridge = EnvHostBridge::default();
        assert_eq!(bridge.bridge_file(), None);
        assert_eq!(bridge.host_user_id(), None);
        bridge.notify(&HostEvent::new("noop", json!(null))).unwrap();
    }
}
