//! Plain-text rendering of the settings view.

use std::fmt;

use client_core::view::{Action, Body, Panel, SettingsView, SystemVersion};

pub struct TextView<'a>(pub &'a SettingsView);

impl fmt::Display for TextView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let view = self.0;
        writeln!(f, "== {} ({})", view.header.hostname, view.header.status)?;

        if let Some(dialog) = &view.wait_dialog {
            writeln!(f, "[{}] {}", dialog.title, dialog.text)?;
        }

        let tiles: Vec<String> = view
            .dashboard
            .tiles
            .iter()
            .map(|tile| format!("{}: {}", tile.label, tile.value.text()))
            .collect();
        writeln!(f, "{}", tiles.join(" | "))?;
        if view.dashboard.expanded {
            for panel in &view.dashboard.panels {
                write_panel(f, panel)?;
            }
        }

        match &view.body {
            Body::UpdateProgress(screen) => {
                writeln!(f)?;
                writeln!(
                    f,
                    "{} {}% ({} kB)",
                    screen.label, screen.percentage, screen.kb_downloaded
                )?;
                writeln!(f, "{}", progress_bar(screen.percentage))?;
                writeln!(f, "{}", screen.warning)?;
            }
            Body::Main(panel) => {
                writeln!(f)?;
                write_actions(f, "Node", &panel.node)?;
                match &panel.version {
                    SystemVersion::UpdateAvailable { current, target } => writeln!(
                        f,
                        "System: {current} -> update to {} available",
                        target.version
                    )?,
                    SystemVersion::UpToDate { current } => {
                        writeln!(f, "System: up to date ({current})")?
                    }
                }
                write_actions(f, "System", &panel.system)?;
                write_actions(f, "Backups", &panel.backups)?;
                write_actions(f, "Advanced", &panel.advanced)?;
            }
        }

        if let Some(dialog) = &view.tor_dialog {
            writeln!(f)?;
            writeln!(f, "-- {} --", dialog.title)?;
            if let Some(onion) = &dialog.onion_address {
                writeln!(f, "{onion}")?;
            }
            writeln!(f, "({})", dialog.disable_label)?;
        }
        Ok(())
    }
}

fn write_panel(f: &mut fmt::Formatter<'_>, panel: &Panel) -> fmt::Result {
    writeln!(f, "  {}", panel.title)?;
    for field in &panel.fields {
        writeln!(f, "    {:<18} {}", field.label, field.value.text())?;
    }
    Ok(())
}

fn write_actions(f: &mut fmt::Formatter<'_>, title: &str, actions: &[Action]) -> fmt::Result {
    let labels: Vec<String> = actions
        .iter()
        .map(|action| {
            let mut label = action.label.to_string();
            if let Some(detail) = &action.detail {
                label.push_str(&format!(" ({detail})"));
            }
            if !action.enabled {
                label.push_str(" [disabled]");
            }
            label
        })
        .collect();
    writeln!(f, "{title}: {}", labels.join(", "))
}

fn progress_bar(percentage: u8) -> String {
    let filled = usize::from(percentage.min(100)) / 5;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(20 - filled))
}
