use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use serde::Deserialize;
use tracing::warn;

use crate::update::ProgressOrdering;

pub const SETTINGS_FILE: &str = "basectl.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub base_url: String,
    pub api_prefix: String,
    pub request_timeout_secs: u64,
    pub progress_ordering: ProgressOrdering,
    pub electrum_connect_enabled: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8082".into(),
            api_prefix: "bitboxbases/default".into(),
            request_timeout_secs: 60,
            progress_ordering: ProgressOrdering::Sequenced,
            electrum_connect_enabled: false,
        }
    }
}

impl ClientSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

/// Loads settings from `path` (or `basectl.toml` if present) and then the environment.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<ClientSettings> {
    let mut settings = match path {
        Some(path) => read_settings_file(path)?,
        None => {
            let default_path = PathBuf::from(SETTINGS_FILE);
            if default_path.exists() {
                read_settings_file(&default_path)?
            } else {
                ClientSettings::default()
            }
        }
    };
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn read_settings_file(path: &Path) -> anyhow::Result<ClientSettings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
    toml::from_str(&raw)
        .with_context(|| format!("failed to parse settings file '{}'", path.display()))
}

pub fn apply_env_overrides(settings: &mut ClientSettings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("BASECTL_BASE_URL") {
        settings.base_url = v;
    }
    if let Some(v) = lookup("BASECTL_API_PREFIX") {
        settings.api_prefix = v;
    }
    if let Some(v) = lookup("BASECTL_REQUEST_TIMEOUT_SECS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.request_timeout_secs = parsed,
            Err(_) => warn!(value = %v, "ignoring invalid BASECTL_REQUEST_TIMEOUT_SECS"),
        }
    }
    if let Some(v) = lookup("BASECTL_PROGRESS_ORDERING") {
        match v.parse::<ProgressOrdering>() {
            Ok(parsed) => settings.progress_ordering = parsed,
            Err(err) => warn!(%err, "ignoring invalid BASECTL_PROGRESS_ORDERING"),
        }
    }
    if let Some(v) = lookup("BASECTL_ELECTRUM_CONNECT") {
        match v.parse::<bool>() {
            Ok(parsed) => settings.electrum_connect_enabled = parsed,
            Err(_) => warn!(value = %v, "ignoring invalid BASECTL_ELECTRUM_CONNECT"),
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
