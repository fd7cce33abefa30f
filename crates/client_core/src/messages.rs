//! User-facing text for prompts, modals and the rendered view.

use shared::protocol::UpdateState;

pub const CONFIRM_RESTART: &str = "Are you sure you want to restart your BitBox Base?";
pub const CONFIRM_SHUTDOWN: &str =
    "Are you sure you want to shut down your BitBox Base? You will need physical access to turn it back on.";
pub const CONFIRM_DISCONNECT: &str = "Are you sure you want to disconnect from this BitBox Base?";
pub const CONFIRM_ENABLE_TOR: &str =
    "Enabling Tor routes all node traffic over the Tor network. Bitcoin services will restart. Continue?";
pub const CONFIRM_DISABLE_TOR: &str =
    "Disabling Tor exposes your node's IP address to its peers. Bitcoin services will restart. Continue?";

pub const APPLYING: &str = "Applying...";
pub const SERVICES_RESTARTING: &str = "Bitcoin services are restarting. This may take a moment.";

pub const NOT_AVAILABLE: &str = "Not available";
pub const LOADING: &str = "Loading...";
pub const UPDATE_WARNING: &str =
    "Do not unplug your BitBox Base while the update is in progress.";

pub fn confirm_tor(currently_enabled: bool) -> &'static str {
    if currently_enabled {
        CONFIRM_DISABLE_TOR
    } else {
        CONFIRM_ENABLE_TOR
    }
}

pub fn enabled(flag: bool) -> &'static str {
    if flag {
        "Enabled"
    } else {
        "Disabled"
    }
}

pub fn update_state_label(state: UpdateState) -> &'static str {
    match state {
        UpdateState::NotInProgress => "No update in progress",
        UpdateState::Downloading => "Downloading update...",
        UpdateState::Failed => "Update failed",
        UpdateState::Applying => "Applying update...",
        UpdateState::Rebooting => "Rebooting...",
    }
}
