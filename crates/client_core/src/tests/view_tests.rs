use super::*;
use shared::protocol::{UpdateProgress, UpdateState};

use crate::update::Updating;

fn props(service_info: Option<ServiceInfo>) -> SettingsProps {
    SettingsProps {
        base_id: Some(BaseId("base-1".into())),
        base_info: BaseInfo {
            hostname: "bitbox-base".into(),
            middleware_local_ip: "192.168.1.20".into(),
            middleware_port: "8845".into(),
            middleware_tor_onion: "abcdefgh.onion".into(),
            is_tor_enabled: true,
            is_bitcoind_listening: true,
            bitcoind_version: "0.19.0".into(),
            lightningd_version: "0.8.0".into(),
            electrs_version: "0.8.2".into(),
            base_version: "0.0.4".into(),
            ..BaseInfo::default()
        },
        service_info,
        ..SettingsProps::default()
    }
}

fn service() -> ServiceInfo {
    ServiceInfo {
        bitcoind_verification_progress: 0.5,
        bitcoind_peers: 8,
        lightning_active_channels: 3,
        bitcoind_blocks: 600_000,
        bitcoind_headers: 600_010,
        lightningd_blocks: 599_990,
        electrs_blocks: 600_000,
    }
}

fn all_fields(view: &SettingsView) -> Vec<&Field> {
    view.dashboard
        .panels
        .iter()
        .flat_map(|panel| panel.fields.iter())
        .collect()
}

#[test]
fn missing_service_info_renders_loading_placeholders() {
    let view = render(&props(None), &SettingsState::default());

    assert!(view
        .dashboard
        .tiles
        .iter()
        .all(|tile| tile.value == Metric::Loading));
    let loading: Vec<_> = all_fields(&view)
        .into_iter()
        .filter(|field| field.value == Metric::Loading)
        .map(|field| field.label)
        .collect();
    assert_eq!(
        loading,
        vec!["Blocks", "Headers", "Lightning blocks", "Electrs blocks"]
    );
}

#[test]
fn service_info_fills_tiles_and_panels() {
    let view = render(&props(Some(service())), &SettingsState::default());

    let tiles: Vec<_> = view
        .dashboard
        .tiles
        .iter()
        .map(|tile| tile.value.text())
        .collect();
    assert_eq!(tiles, vec!["50.00%", "8", "3"]);
    assert!(all_fields(&view)
        .iter()
        .all(|field| field.value != Metric::Loading));
}

#[test]
fn updating_replaces_main_panel_with_progress_screen() {
    let state = SettingsState {
        updating: Updating::Active,
        update_progress: UpdateProgress {
            state: UpdateState::Downloading,
            percentage: 40,
            kb_downloaded: 12000,
        },
        ..SettingsState::default()
    };

    let view = render(&props(None), &state);

    let Body::UpdateProgress(screen) = view.body else {
        panic!("expected update screen");
    };
    assert_eq!(screen.percentage, 40);
    assert_eq!(screen.label, messages::update_state_label(UpdateState::Downloading));
    assert_eq!(screen.warning, messages::UPDATE_WARNING);
}

#[test]
fn failed_progress_without_update_mode_keeps_main_panel() {
    let state = SettingsState {
        updating: Updating::Inactive,
        update_progress: UpdateProgress {
            state: UpdateState::Failed,
            percentage: 0,
            kb_downloaded: 0,
        },
        ..SettingsState::default()
    };

    let view = render(&props(None), &state);

    assert!(matches!(view.body, Body::Main(_)));
}

#[test]
fn update_button_needs_flag_and_info() {
    let mut with_update = props(None);
    with_update.update_available = true;
    with_update.update_info = Some(UpdateInfo {
        version: "0.0.5".into(),
        description: "Security fixes".into(),
    });
    let Body::Main(panel) = render(&with_update, &SettingsState::default()).body else {
        panic!("expected main panel");
    };
    assert!(matches!(
        panel.version,
        SystemVersion::UpdateAvailable { ref target, .. } if target.version == "0.0.5"
    ));

    let mut flag_only = props(None);
    flag_only.update_available = true;
    let Body::Main(panel) = render(&flag_only, &SettingsState::default()).body else {
        panic!("expected main panel");
    };
    assert_eq!(
        panel.version,
        SystemVersion::UpToDate {
            current: "0.0.4".into()
        }
    );
}

#[test]
fn tor_dialog_shows_onion_only_when_enabled() {
    let state = SettingsState {
        expanded_tor_address: true,
        ..SettingsState::default()
    };

    let enabled = render(&props(None), &state);
    let dialog = enabled.tor_dialog.expect("dialog");
    assert_eq!(dialog.title, "Tor: enabled");
    assert_eq!(dialog.onion_address.as_deref(), Some("abcdefgh.onion"));

    let mut tor_off = props(None);
    tor_off.base_info.is_tor_enabled = false;
    let disabled = render(&tor_off, &state);
    let dialog = disabled.tor_dialog.expect("dialog");
    assert_eq!(dialog.title, "Tor: disabled");
    assert!(dialog.onion_address.is_none());

    assert!(render(&props(None), &SettingsState::default())
        .tor_dialog
        .is_none());
}

#[test]
fn header_falls_back_when_user_status_missing() {
    let view = render(&props(None), &SettingsState::default());
    assert_eq!(view.header.hostname, "bitbox-base");
    assert_eq!(view.header.status, messages::NOT_AVAILABLE);

    let mut with_status = props(None);
    with_status.base_user_status = Some("Online".into());
    assert_eq!(
        render(&with_status, &SettingsState::default()).header.status,
        "Online"
    );
}

#[test]
fn wait_dialog_is_rendered_from_state() {
    let state = SettingsState {
        wait_dialog: Some(WaitDialog {
            title: messages::APPLYING.into(),
            text: messages::SERVICES_RESTARTING.into(),
        }),
        ..SettingsState::default()
    };

    let view = render(&props(None), &state);

    assert_eq!(view.wait_dialog, state.wait_dialog);
}

#[test]
fn electrum_and_unfinished_actions_render_disabled() {
    let Body::Main(panel) = render(&props(None), &SettingsState::default()).body else {
        panic!("expected main panel");
    };
    let disabled: Vec<_> = panel
        .advanced
        .iter()
        .chain(panel.backups.iter())
        .filter(|action| !action.enabled)
        .map(|action| action.label)
        .collect();
    assert_eq!(
        disabled,
        vec!["Connect Electrum", "Sync options", "Manual", "Reset", "Restore backup"]
    );
}

#[test]
fn verification_progress_truncates_to_two_decimals() {
    assert_eq!(format_verification_progress(0.0), "0.00");
    assert_eq!(format_verification_progress(0.1234), "12.34");
    assert_eq!(format_verification_progress(0.99999), "99.99");
    assert_eq!(format_verification_progress(0.9999999999), "99.99");
    assert_eq!(format_verification_progress(0.99999999995), "99.99");
    assert_eq!(format_verification_progress(1.0), "100.00");
    assert_eq!(format_verification_progress(1.7), "100.00");
}
