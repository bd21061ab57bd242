//! Host bridge port - the embedding environment
//!
//! When the tracker runs inside a host application, the host can supply the
//! acting user's identifier and receive notifications about user actions.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::domain::result::Result;

/// Structured notification handed to the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: JsonValue,
}

impl HostEvent {
    pub fn new(kind: impl Into<String>, data: JsonValue) -> Self {
        Self {
            kind: kind.into(),
            data,
        }
    }
}

pub trait HostBridge: Send + Sync {
    /// Numeric user id provided by the host, if any
    fn host_user_id(&self) -> Option<i64>;

    /// Deliver an event to the host
    fn notify(&self, event: &HostEvent) -> Result<()>;
}
