//! Pure mapping from parent props and controller state to a view tree.

use shared::domain::{BaseId, BaseInfo, ServiceInfo, UpdateInfo};

use crate::{controller::SettingsState, controller::WaitDialog, messages};

/// Read-only inputs owned by the parent view.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SettingsProps {
    pub base_id: Option<BaseId>,
    pub base_info: BaseInfo,
    pub service_info: Option<ServiceInfo>,
    pub update_available: bool,
    pub update_info: Option<UpdateInfo>,
    pub base_user_status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Metric {
    Loading,
    Ready(String),
}

impl Metric {
    fn from_service<T: ToString>(
        service: Option<&ServiceInfo>,
        f: impl Fn(&ServiceInfo) -> T,
    ) -> Self {
        match service {
            Some(info) => Self::Ready(f(info).to_string()),
            None => Self::Loading,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Loading => messages::LOADING,
            Self::Ready(value) => value,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SettingsView {
    pub header: Header,
    pub wait_dialog: Option<WaitDialog>,
    pub dashboard: Dashboard,
    pub body: Body,
    pub tor_dialog: Option<TorDialog>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub hostname: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub label: &'static str,
    pub value: Metric,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub label: &'static str,
    pub value: Metric,
}

impl Field {
    fn ready(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: Metric::Ready(value.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    pub title: &'static str,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    pub expanded: bool,
    pub tiles: Vec<Tile>,
    pub panels: Vec<Panel>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    UpdateProgress(UpdateScreen),
    Main(MainPanel),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateScreen {
    pub label: &'static str,
    pub percentage: u8,
    pub kb_downloaded: u64,
    pub warning: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub label: &'static str,
    pub detail: Option<String>,
    pub enabled: bool,
    pub danger: bool,
}

impl Action {
    fn enabled(label: &'static str) -> Self {
        Self {
            label,
            detail: None,
            enabled: true,
            danger: false,
        }
    }

    fn disabled(label: &'static str) -> Self {
        Self {
            enabled: false,
            ..Self::enabled(label)
        }
    }

    fn danger(mut self) -> Self {
        self.danger = true;
        self
    }

    fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemVersion {
    UpdateAvailable { current: String, target: UpdateInfo },
    UpToDate { current: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MainPanel {
    pub node: Vec<Action>,
    pub version: SystemVersion,
    pub system: Vec<Action>,
    pub backups: Vec<Action>,
    pub advanced: Vec<Action>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorDialog {
    pub title: String,
    /// Onion address for the QR code and copy field; only shown while Tor is on.
    pub onion_address: Option<String>,
    pub disable_label: &'static str,
}

pub fn render(props: &SettingsProps, state: &SettingsState) -> SettingsView {
    let info = &props.base_info;
    let service = props.service_info.as_ref();

    SettingsView {
        header: Header {
            hostname: info.hostname.clone(),
            status: props
                .base_user_status
                .clone()
                .unwrap_or_else(|| messages::NOT_AVAILABLE.to_string()),
        },
        wait_dialog: state.wait_dialog.clone(),
        dashboard: render_dashboard(info, service, state.expanded_dashboard),
        body: if state.updating.is_active() {
            Body::UpdateProgress(UpdateScreen {
                label: messages::update_state_label(state.update_progress.state),
                percentage: state.update_progress.percentage,
                kb_downloaded: state.update_progress.kb_downloaded,
                warning: messages::UPDATE_WARNING,
            })
        } else {
            Body::Main(render_main(props))
        },
        tor_dialog: state.expanded_tor_address.then(|| TorDialog {
            title: format!(
                "Tor: {}",
                messages::enabled(info.is_tor_enabled).to_ascii_lowercase()
            ),
            onion_address: info
                .is_tor_enabled
                .then(|| info.middleware_tor_onion.clone()),
            disable_label: "Disable",
        }),
    }
}

fn render_dashboard(info: &BaseInfo, service: Option<&ServiceInfo>, expanded: bool) -> Dashboard {
    let blocks = |label, f: fn(&ServiceInfo) -> u64| Field {
        label,
        value: Metric::from_service(service, f),
    };

    Dashboard {
        expanded,
        tiles: vec![
            Tile {
                label: "Sync status",
                value: match service {
                    Some(s) => Metric::Ready(format!(
                        "{}%",
                        format_verification_progress(s.bitcoind_verification_progress)
                    )),
                    None => Metric::Loading,
                },
            },
            Tile {
                label: "Peers",
                value: Metric::from_service(service, |s| s.bitcoind_peers),
            },
            Tile {
                label: "Lightning channels",
                value: Metric::from_service(service, |s| s.lightning_active_channels),
            },
        ],
        panels: vec![
            Panel {
                title: "Networking",
                fields: vec![
                    Field::ready("IP address", &info.middleware_local_ip),
                    Field::ready("Port", &info.middleware_port),
                    Field::ready("Tor address", &info.middleware_tor_onion),
                ],
            },
            Panel {
                title: "Bitcoin",
                fields: vec![
                    Field::ready(
                        "Status",
                        if info.is_bitcoind_listening {
                            "Listening"
                        } else {
                            "Offline"
                        },
                    ),
                    Field::ready("Version", &info.bitcoind_version),
                    blocks("Blocks", |s| s.bitcoind_blocks),
                    blocks("Headers", |s| s.bitcoind_headers),
                ],
            },
            Panel {
                title: "Lightning and Electrs",
                fields: vec![
                    Field::ready("Lightning version", &info.lightningd_version),
                    blocks("Lightning blocks", |s| s.lightningd_blocks),
                    Field::ready("Electrs version", &info.electrs_version),
                    blocks("Electrs blocks", |s| s.electrs_blocks),
                ],
            },
        ],
    }
}

fn render_main(props: &SettingsProps) -> MainPanel {
    let info = &props.base_info;
    let version = match (&props.update_info, props.update_available) {
        (Some(target), true) => SystemVersion::UpdateAvailable {
            current: info.base_version.clone(),
            target: target.clone(),
        },
        _ => SystemVersion::UpToDate {
            current: info.base_version.clone(),
        },
    };

    MainPanel {
        node: vec![
            Action::enabled("Change hostname").with_detail(&info.hostname),
            Action::enabled("Change password"),
            Action::enabled("Tor").with_detail(messages::enabled(info.is_tor_enabled)),
            Action::enabled("Disconnect").danger(),
        ],
        version,
        system: vec![Action::enabled("Restart"), Action::enabled("Shut down")],
        backups: vec![Action::enabled("Create backup"), Action::disabled("Restore backup")],
        advanced: vec![
            Action::enabled("SSH password login")
                .with_detail(messages::enabled(info.is_ssh_password_login_enabled)),
            Action::enabled("Set system password"),
            Action::disabled("Connect Electrum"),
            Action::disabled("Sync options"),
            Action::disabled("Manual"),
            Action::disabled("Reset").danger(),
        ],
    }
}

/// Formats a `0.0..=1.0` fraction as a percentage with two truncated decimals.
pub fn format_verification_progress(progress: f64) -> String {
    let progress = progress.clamp(0.0, 1.0);
    let mut hundredths = (progress * 10_000.0 + 1e-6).floor() as u64;
    if progress < 1.0 {
        hundredths = hundredths.min(9_999);
    }
    format!("{}.{:02}", hundredths / 100, hundredths % 100)
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
