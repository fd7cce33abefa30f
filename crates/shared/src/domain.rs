use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_newtype!(BaseId);

/// Descriptive attributes of a base, refreshed by the parent view.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseInfo {
    pub hostname: String,
    #[serde(rename = "middlewareLocalIP")]
    pub middleware_local_ip: String,
    pub middleware_port: String,
    pub middleware_tor_onion: String,
    pub is_tor_enabled: bool,
    pub is_bitcoind_listening: bool,
    #[serde(rename = "isSSHPasswordLoginEnabled", default)]
    pub is_ssh_password_login_enabled: bool,
    pub bitcoind_version: String,
    pub lightningd_version: String,
    pub electrs_version: String,
    pub base_version: String,
}

/// Live service metrics. Absent until the first successful fetch.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInfo {
    /// Fraction in `0.0..=1.0` as reported by bitcoind.
    pub bitcoind_verification_progress: f64,
    pub bitcoind_peers: u32,
    pub lightning_active_channels: u32,
    pub bitcoind_blocks: u64,
    pub bitcoind_headers: u64,
    pub lightningd_blocks: u64,
    pub electrs_blocks: u64,
}

/// Release advertised by the update server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateInfo {
    pub version: String,
    #[serde(default)]
    pub description: String,
}
