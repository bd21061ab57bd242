//! Session - the acting user, resolved once at startup

use serde::Serialize;

/// Where the session user id came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentitySource {
    /// Identifier handed over by the embedding host
    Host,
    /// Random identifier persisted on this device
    Local,
}

/// Explicit session context passed to every service call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    user_id: String,
    source: IdentitySource,
}

impl Session {
    pub fn new(user_id: impl Into<String>, source: IdentitySource) -> Self {
        Self {
            user_id: user_id.into(),
            source,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn source(&self) -> IdentitySource {
        self.source
    }
}
