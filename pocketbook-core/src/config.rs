//! Configuration management
//!
//! Settings live in `<data dir>/settings.json`:
//! ```json
//! {
//!   "remote": { "url": "https://x.supabase.co", "anonKey": "...", "timeoutSecs": 10 },
//!   "identity": { "localUserId": "loc_ab12cd34" },
//!   "display": { "currencySymbol": "₽", "listLimit": 50 }
//! }
//! ```
//! Keys this crate does not know about are preserved on save. A section that
//! fails to parse is ignored on load; the first save over such a file keeps a
//! copy of it as `settings.json.bak`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::adapters::rest::DEFAULT_TIMEOUT_SECS;

pub const DATA_DIR_VAR: &str = "POCKETBOOK_DIR";
pub const REMOTE_URL_VAR: &str = "POCKETBOOK_REMOTE_URL";
pub const REMOTE_KEY_VAR: &str = "POCKETBOOK_REMOTE_KEY";

const DEFAULT_CURRENCY_SYMBOL: &str = "₽";
const DEFAULT_LIST_LIMIT: usize = 50;

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    remote: RemoteSettings,
    #[serde(default)]
    identity: IdentitySettings,
    #[serde(default)]
    display: DisplaySettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    anon_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timeout_secs: Option<u64>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdentitySettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    local_user_id: Option<String>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DisplaySettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    currency_symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    list_limit: Option<usize>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Connection details of the remote mirror
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    pub url: String,
    pub anon_key: String,
    pub timeout: Duration,
}

/// Pocketbook configuration (resolved view of settings plus environment)
#[derive(Debug, Clone)]
pub struct Config {
    pub remote_url: Option<String>,
    pub remote_key: Option<String>,
    pub remote_timeout_secs: u64,
    pub local_user_id: Option<String>,
    pub currency_symbol: String,
    pub list_limit: usize,
    remote_from_env: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_settings(&SettingsFile::default())
    }
}

/// Data directory: `POCKETBOOK_DIR`, else `~/.pocketbook`
pub fn data_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(DATA_DIR_VAR).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".pocketbook"))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Settings as read from disk; `intact` is false when parts had to be dropped
struct LoadedSettings {
    settings: SettingsFile,
    intact: bool,
}

fn section<T: DeserializeOwned + Default>(
    map: &mut serde_json::Map<String, serde_json::Value>,
    key: &str,
) -> T {
    map.remove(key)
        .and_then(|value| serde_json::from_value(value).ok())
        .unwrap_or_default()
}

/// Keep every section that still parses when the file as a whole does not
fn salvage(value: serde_json::Value) -> SettingsFile {
    let serde_json::Value::Object(mut map) = value else {
        return SettingsFile::default();
    };
    SettingsFile {
        remote: section(&mut map, "remote"),
        identity: section(&mut map, "identity"),
        display: section(&mut map, "display"),
        other: map.into_iter().collect(),
    }
}

fn read_settings(settings_path: &Path) -> Result<LoadedSettings> {
    if !settings_path.exists() {
        return Ok(LoadedSettings {
            settings: SettingsFile::default(),
            intact: true,
        });
    }
    let content = std::fs::read_to_string(settings_path)
        .with_context(|| format!("Failed to read {}", settings_path.display()))?;
    match serde_json::from_str(&content) {
        Ok(settings) => Ok(LoadedSettings {
            settings,
            intact: true,
        }),
        Err(e) => {
            eprintln!(
                "[pocketbook] Ignoring invalid parts of {}: {}",
                settings_path.display(),
                e
            );
            let settings = serde_json::from_str(&content)
                .map(salvage)
                .unwrap_or_default();
            Ok(LoadedSettings {
                settings,
                intact: false,
            })
        }
    }
}

impl Config {
    fn from_settings(raw: &SettingsFile) -> Self {
        Self {
            remote_url: non_empty(raw.remote.url.clone()),
            remote_key: non_empty(raw.remote.anon_key.clone()),
            remote_timeout_secs: raw.remote.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            local_user_id: non_empty(raw.identity.local_user_id.clone()),
            currency_symbol: raw
                .display
                .currency_symbol
                .clone()
                .unwrap_or_else(|| DEFAULT_CURRENCY_SYMBOL.to_string()),
            list_limit: raw.display.list_limit.unwrap_or(DEFAULT_LIST_LIMIT),
            remote_from_env: false,
        }
    }

    /// Load config from the data directory, then apply environment overrides
    pub fn load(data_dir: &Path) -> Result<Self> {
        let mut config = Self::load_file(data_dir)?;
        config.apply_remote_overrides(
            std::env::var(REMOTE_URL_VAR).ok(),
            std::env::var(REMOTE_KEY_VAR).ok(),
        );
        Ok(config)
    }

    /// Load settings.json only
    pub fn load_file(data_dir: &Path) -> Result<Self> {
        let loaded = read_settings(&data_dir.join("settings.json"))?;
        Ok(Self::from_settings(&loaded.settings))
    }

    /// Override the remote connection; empty values are ignored
    pub fn apply_remote_overrides(&mut self, url: Option<String>, key: Option<String>) {
        if let Some(url) = non_empty(url) {
            self.remote_url = Some(url);
            self.remote_from_env = true;
        }
        if let Some(key) = non_empty(key) {
            self.remote_key = Some(key);
            self.remote_from_env = true;
        }
    }

    /// Remote mirror settings, present only when both URL and key are set
    pub fn remote(&self) -> Option<RemoteConfig> {
        match (&self.remote_url, &self.remote_key) {
            (Some(url), Some(key)) => Some(RemoteConfig {
                url: url.clone(),
                anon_key: key.clone(),
                timeout: Duration::from_secs(self.remote_timeout_secs),
            }),
            _ => None,
        }
    }

    /// Save config to the data directory
    ///
    /// Preserves settings this crate doesn't manage. Remote values that came
    /// from the environment are never written. A file that did not parse is
    /// copied to `settings.json.bak` before it is replaced.
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create {}", data_dir.display()))?;
        let settings_path = data_dir.join("settings.json");

        let LoadedSettings {
            mut settings,
            intact,
        } = read_settings(&settings_path)?;
        if !intact {
            let backup_path = data_dir.join("settings.json.bak");
            std::fs::copy(&settings_path, &backup_path)
                .with_context(|| format!("Failed to back up {}", settings_path.display()))?;
            eprintln!(
                "[pocketbook] Kept the unreadable settings as {}",
                backup_path.display()
            );
        }

        if !self.remote_from_env {
            settings.remote.url = self.remote_url.clone();
            settings.remote.anon_key = self.remote_key.clone();
        }
        if self.remote_timeout_secs != DEFAULT_TIMEOUT_SECS || settings.remote.timeout_secs.is_some() {
            settings.remote.timeout_secs = Some(self.remote_timeout_secs);
        }
        settings.identity.local_user_id = self.local_user_id.clone();
        settings.display.currency_symbol = Some(self.currency_symbol.clone());
        settings.display.list_limit = Some(self.list_limit);

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)
            .with_context(|| format!("Failed to write {}", settings_path.display()))?;
        Ok(())
    }
}
