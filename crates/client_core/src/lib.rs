use async_trait::async_trait;
use serde_json::Value;
use shared::{error::Notice, error::RequestError, protocol::BaseEvent};
use tokio::sync::mpsc;

pub mod api;
pub mod config;
pub mod controller;
pub mod messages;
pub mod transport;
pub mod update;
pub mod view;

pub use api::BaseApi;
pub use config::{load_settings, ClientSettings};
pub use controller::{
    ActionOutcome, ControllerError, MountGuard, SettingsController, SettingsDeps, SettingsState,
    WaitDialog,
};
pub use transport::{HttpTransport, WsEventSource};
pub use update::{ProgressOrdering, Reconciliation, UpdateTracker, Updating};
pub use view::{render, SettingsProps, SettingsView};

/// Request/response access to a base's API. Paths are relative to the base URL.
#[async_trait]
pub trait BaseTransport: Send + Sync {
    async fn get(&self, path: &str) -> Result<Value, RequestError>;
    async fn post(&self, path: &str, body: Option<Value>) -> Result<Value, RequestError>;
}

/// Publish/subscribe access to a base's push events.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn subscribe(&self, topic: &str) -> Result<Subscription, RequestError>;
}

/// Confirmation prompts and user-visible alerts.
#[async_trait]
pub trait UserPrompt: Send + Sync {
    /// Resolves once with the user's answer.
    async fn confirm(&self, text: &str) -> bool;
    fn alert(&self, notice: &Notice);
}

/// Hooks back into the view that owns the base's info.
pub trait BaseHost: Send + Sync {
    /// Asks the owner to refetch `BaseInfo`.
    fn get_base_info(&self);
    fn disconnect(&self);
    fn connect_electrum(&self);
}

/// A live event subscription. Dropping it releases the underlying resource.
pub struct Subscription {
    events: mpsc::Receiver<BaseEvent>,
    release: ReleaseHandle,
}

impl Subscription {
    pub fn new(events: mpsc::Receiver<BaseEvent>, release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            events,
            release: ReleaseHandle {
                release: Some(Box::new(release)),
            },
        }
    }

    pub async fn recv(&mut self) -> Option<BaseEvent> {
        self.events.recv().await
    }

    pub fn into_parts(self) -> (mpsc::Receiver<BaseEvent>, ReleaseHandle) {
        (self.events, self.release)
    }
}

/// Runs the release callback of a [`Subscription`] at most once.
pub struct ReleaseHandle {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl ReleaseHandle {
    pub fn unsubscribe(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }

    pub fn is_released(&self) -> bool {
        self.release.is_none()
    }
}

impl Drop for ReleaseHandle {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
