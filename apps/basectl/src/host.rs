//! Terminal implementations of the controller's prompt and parent hooks.

use std::{
    io::{self, Write},
    sync::Arc,
};

use async_trait::async_trait;
use client_core::{BaseApi, BaseHost, SettingsProps, UserPrompt};
use shared::error::Notice;
use tokio::sync::{watch, Notify};
use tracing::{info, warn};

pub struct TerminalPrompt {
    assume_yes: bool,
}

impl TerminalPrompt {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

#[async_trait]
impl UserPrompt for TerminalPrompt {
    async fn confirm(&self, text: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        let prompt = format!("{text} [y/N] ");
        let answer = tokio::task::spawn_blocking(move || {
            print!("{prompt}");
            let _ = io::stdout().flush();
            let mut line = String::new();
            io::stdin().read_line(&mut line).map(|_| line)
        })
        .await;
        match answer {
            Ok(Ok(line)) => matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            _ => false,
        }
    }

    fn alert(&self, notice: &Notice) {
        eprintln!("! {}", notice.message);
    }
}

/// Owns the base's props on behalf of the controller.
pub struct CliHost {
    api: BaseApi,
    props: Arc<watch::Sender<SettingsProps>>,
    disconnected: Notify,
}

impl CliHost {
    pub fn new(api: BaseApi, props: Arc<watch::Sender<SettingsProps>>) -> Self {
        Self {
            api,
            props,
            disconnected: Notify::new(),
        }
    }

    pub async fn disconnected(&self) {
        self.disconnected.notified().await;
    }
}

impl BaseHost for CliHost {
    fn get_base_info(&self) {
        let api = self.api.clone();
        let props = Arc::clone(&self.props);
        tokio::spawn(async move {
            match api.base_info().await {
                Ok(info) => props.send_modify(|props| props.base_info = info),
                Err(err) => warn!(%err, "failed to refresh base info"),
            }
        });
    }

    fn disconnect(&self) {
        info!("disconnect requested");
        self.disconnected.notify_one();
    }

    fn connect_electrum(&self) {
        info!(prefix = self.api.prefix(), "electrum connection requested");
    }
}
