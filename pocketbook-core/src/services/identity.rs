//! Identity service - resolves the acting user once per session
//!
//! A host-supplied numeric id wins and becomes `tg_<id>`. Without a host the
//! device keeps a random `loc_xxxxxxxx` id in settings.json so later
//! sessions on the same device see the same data.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rand::Rng;

use crate::config::Config;
use crate::domain::{IdentitySource, Session};
use crate::ports::HostBridge;

const HOST_PREFIX: &str = "tg_";
const LOCAL_PREFIX: &str = "loc_";
const LOCAL_ID_LEN: usize = 8;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// `loc_` followed by eight random base-36 characters
pub fn generate_local_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..LOCAL_ID_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{}{}", LOCAL_PREFIX, suffix)
}

pub struct IdentityService {
    data_dir: PathBuf,
}

impl IdentityService {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
        }
    }

    /// Resolve the session user, persisting a fresh local id when needed
    pub fn resolve(&self, config: &mut Config, host: Option<&dyn HostBridge>) -> Result<Session> {
        if let Some(id) = host.and_then(|h| h.host_user_id()) {
            return Ok(Session::new(format!("{}{}", HOST_PREFIX, id), IdentitySource::Host));
        }

        if let Some(id) = &config.local_user_id {
            return Ok(Session::new(id.clone(), IdentitySource::Local));
        }

        let id = generate_local_id();
        config.local_user_id = Some(id.clone());
        config
            .save(&self.data_dir)
            .context("Failed to persist local user id")?;
        Ok(Session::new(id, IdentitySource::Local))
    }
}
