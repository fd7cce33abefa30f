use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use client_core::{
    load_settings, render, ActionOutcome, BaseApi, HttpTransport, SettingsController,
    SettingsDeps, SettingsProps, WsEventSource,
};
use shared::domain::BaseId;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod display;
mod host;

use display::TextView;
use host::{CliHost, TerminalPrompt};

#[derive(Parser, Debug)]
#[command(name = "basectl", about = "Inspect and manage a BitBox Base")]
struct Args {
    /// Settings file; defaults to ./basectl.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    base_url: Option<String>,
    #[arg(long)]
    api_prefix: Option<String>,
    /// Answer yes to every confirmation prompt.
    #[arg(long, short = 'y')]
    yes: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the settings dashboard once.
    ///
    /// Update availability and the user status header are not populated;
    /// they belong to the base list this client does not keep.
    Show,
    /// Follow update progress and re-render on every change until Ctrl-C.
    Watch,
    Restart,
    Shutdown,
    Update {
        version: String,
    },
    Tor {
        #[arg(value_enum)]
        switch: TorSwitch,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum TorSwitch {
    Enable,
    Disable,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(v) = args.base_url {
        settings.base_url = v;
    }
    if let Some(v) = args.api_prefix {
        settings.api_prefix = v;
    }

    let transport = HttpTransport::new(&settings.base_url, settings.request_timeout())
        .context("failed to set up http transport")?;
    let api = BaseApi::new(Arc::new(transport), &settings.api_prefix);
    let props = fetch_props(&api).await?;
    let props_tx = Arc::new(watch::channel(props).0);
    let host = Arc::new(CliHost::new(api.clone(), Arc::clone(&props_tx)));
    let events = WsEventSource::new(&settings.base_url)
        .context("failed to set up event subscription")?;

    let controller = SettingsController::new(
        &settings,
        SettingsDeps {
            api,
            events: Arc::new(events),
            prompt: Arc::new(TerminalPrompt::new(args.yes)),
            host: host.clone(),
        },
        props_tx.subscribe(),
    );

    let outcome = match args.command {
        Command::Show => {
            print_view(&controller);
            return Ok(());
        }
        Command::Watch => return watch_base(&controller, &host, &props_tx).await,
        Command::Restart => controller.restart().await,
        Command::Shutdown => controller.shutdown().await,
        Command::Update { version } => controller.update_base(&version).await,
        Command::Tor { switch } => {
            controller
                .toggle_tor(matches!(switch, TorSwitch::Enable))
                .await
        }
    };

    match outcome {
        ActionOutcome::Completed => info!("done"),
        ActionOutcome::Cancelled => info!("cancelled"),
        ActionOutcome::Unavailable => warn!("action is not available"),
        ActionOutcome::Failed => bail!("base rejected the request"),
    }
    Ok(())
}

async fn fetch_props(api: &BaseApi) -> Result<SettingsProps> {
    let base_info = api.base_info().await.context("failed to fetch base info")?;
    let service_info = match api.service_info().await {
        Ok(info) => Some(info),
        Err(err) => {
            warn!(%err, "service info not available yet");
            None
        }
    };
    Ok(SettingsProps {
        base_id: api.prefix().rsplit('/').next().map(|id| BaseId(id.to_string())),
        base_info,
        service_info,
        ..SettingsProps::default()
    })
}

fn print_view(controller: &SettingsController) {
    let view = render(&controller.props(), &controller.state());
    println!("{}", TextView(&view));
}

async fn watch_base(
    controller: &Arc<SettingsController>,
    host: &CliHost,
    props_tx: &watch::Sender<SettingsProps>,
) -> Result<()> {
    let guard = controller.mount().await?;
    let mut state_rx = controller.watch_state();
    let mut props_rx = props_tx.subscribe();
    print_view(controller);

    loop {
        tokio::select! {
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            changed = props_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = host.disconnected() => {
                info!("disconnected from base");
                break;
            }
            signal = tokio::signal::ctrl_c() => {
                signal.context("failed to listen for ctrl-c")?;
                break;
            }
        }
        print_view(controller);
        // Already shown through the prompt's alert.
        controller.take_notices().await;
    }

    guard.unmount();
    Ok(())
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
