//! Settings controller: owns UI state, listens for base events and dispatches actions.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use shared::{
    error::{Notice, RequestError},
    protocol::UpdateProgress,
};
use thiserror::Error;
use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
};
use tokio_stream::{wrappers::ReceiverStream, StreamExt};
use tracing::{debug, info, warn};

use crate::{
    api::BaseApi,
    config::ClientSettings,
    messages,
    update::{ProgressOrdering, Reconciliation, UpdateTracker, Updating},
    view::SettingsProps,
    BaseHost, EventSource, ReleaseHandle, UserPrompt,
};

/// Blocking modal shown while a request that restarts services is in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitDialog {
    pub title: String,
    pub text: String,
}

/// Snapshot of everything the controller owns.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SettingsState {
    pub expanded_dashboard: bool,
    pub expanded_tor_address: bool,
    pub updating: Updating,
    pub update_progress: UpdateProgress,
    pub wait_dialog: Option<WaitDialog>,
    /// Alerts raised since the presenter last drained them.
    pub notices: Vec<Notice>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Completed,
    Cancelled,
    Failed,
    /// The action is disabled in this build or configuration.
    Unavailable,
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("settings controller is already mounted")]
    AlreadyMounted,
    #[error("settings controller was unmounted")]
    Unmounted,
    #[error("failed to subscribe to base events: {0}")]
    Subscribe(#[source] RequestError),
}

pub struct SettingsDeps {
    pub api: BaseApi,
    pub events: Arc<dyn EventSource>,
    pub prompt: Arc<dyn UserPrompt>,
    pub host: Arc<dyn BaseHost>,
}

struct Inner {
    expanded_dashboard: bool,
    expanded_tor_address: bool,
    wait_dialog: Option<WaitDialog>,
    notices: Vec<Notice>,
    tracker: UpdateTracker,
}

impl Inner {
    fn snapshot(&self) -> SettingsState {
        SettingsState {
            expanded_dashboard: self.expanded_dashboard,
            expanded_tor_address: self.expanded_tor_address,
            updating: self.tracker.updating(),
            update_progress: self.tracker.progress(),
            wait_dialog: self.wait_dialog.clone(),
            notices: self.notices.clone(),
        }
    }
}

pub struct SettingsController {
    api: BaseApi,
    events: Arc<dyn EventSource>,
    prompt: Arc<dyn UserPrompt>,
    host: Arc<dyn BaseHost>,
    props: watch::Receiver<SettingsProps>,
    electrum_connect_enabled: bool,
    inner: Mutex<Inner>,
    state_tx: watch::Sender<SettingsState>,
    mounted: AtomicBool,
    torn_down: AtomicBool,
}

impl SettingsController {
    pub fn new(
        settings: &ClientSettings,
        deps: SettingsDeps,
        props: watch::Receiver<SettingsProps>,
    ) -> Arc<Self> {
        Self::with_ordering(
            settings.progress_ordering,
            settings.electrum_connect_enabled,
            deps,
            props,
        )
    }

    pub fn with_ordering(
        ordering: ProgressOrdering,
        electrum_connect_enabled: bool,
        deps: SettingsDeps,
        props: watch::Receiver<SettingsProps>,
    ) -> Arc<Self> {
        let inner = Inner {
            expanded_dashboard: false,
            expanded_tor_address: false,
            wait_dialog: None,
            notices: Vec::new(),
            tracker: UpdateTracker::new(ordering),
        };
        let (state_tx, _) = watch::channel(inner.snapshot());
        Arc::new(Self {
            api: deps.api,
            events: deps.events,
            prompt: deps.prompt,
            host: deps.host,
            props,
            electrum_connect_enabled,
            inner: Mutex::new(inner),
            state_tx,
            mounted: AtomicBool::new(false),
            torn_down: AtomicBool::new(false),
        })
    }

    pub fn state(&self) -> SettingsState {
        self.state_tx.borrow().clone()
    }

    pub fn watch_state(&self) -> watch::Receiver<SettingsState> {
        self.state_tx.subscribe()
    }

    pub fn props(&self) -> SettingsProps {
        self.props.borrow().clone()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::SeqCst)
    }

    fn publish(&self, inner: &Inner) {
        self.state_tx.send_replace(inner.snapshot());
    }

    fn surface(&self, inner: &mut Inner, err: &RequestError) {
        warn!(error = %err, "base request failed");
        let notice = Notice::from(err);
        self.prompt.alert(&notice);
        inner.notices.push(notice);
    }

    /// Subscribes to the base's event topic and starts reacting to progress events.
    ///
    /// The subscription is released exactly once, when the returned guard is
    /// unmounted or dropped. After that the controller ignores late responses.
    pub async fn mount(self: &Arc<Self>) -> Result<MountGuard, ControllerError> {
        if self.is_torn_down() {
            return Err(ControllerError::Unmounted);
        }
        if self.mounted.swap(true, Ordering::SeqCst) {
            return Err(ControllerError::AlreadyMounted);
        }

        let topic = self.api.event_topic();
        let subscription = match self.events.subscribe(&topic).await {
            Ok(subscription) => subscription,
            Err(err) => {
                self.mounted.store(false, Ordering::SeqCst);
                return Err(ControllerError::Subscribe(err));
            }
        };
        let (events, release) = subscription.into_parts();
        info!(%topic, "subscribed to base events");

        let controller = Arc::clone(self);
        let listener = tokio::spawn(async move {
            let mut events = ReceiverStream::new(events);
            while let Some(event) = events.next().await {
                if event.is_update_progress_changed() {
                    let controller = Arc::clone(&controller);
                    tokio::spawn(async move {
                        controller.on_update_progress_changed().await;
                    });
                } else {
                    debug!(object = %event.object, "ignoring base event");
                }
            }
        });

        Ok(MountGuard {
            controller: Arc::clone(self),
            listener: Some(listener),
            release,
        })
    }

    /// Fetches the authoritative progress and reconciles it into local state.
    pub async fn on_update_progress_changed(&self) {
        let ticket = self.inner.lock().await.tracker.issue_fetch();
        let result = self.api.update_progress().await;

        let mut inner = self.inner.lock().await;
        if self.is_torn_down() {
            debug!(?ticket, "dropping progress fetch that completed after unmount");
            return;
        }
        match inner.tracker.apply_fetch(ticket, result) {
            Reconciliation::Applied { entered_update } => {
                let progress = inner.tracker.progress();
                debug!(
                    ?ticket,
                    state = ?progress.state,
                    percentage = progress.percentage,
                    entered_update,
                    "applied update progress"
                );
            }
            Reconciliation::Stale => {
                warn!(?ticket, "discarding stale update progress snapshot");
            }
            Reconciliation::Failed(err) => self.surface(&mut inner, &err),
        }
        self.publish(&inner);
    }

    async fn settle(&self, result: Result<(), RequestError>) -> ActionOutcome {
        match result {
            Ok(()) => ActionOutcome::Completed,
            Err(err) => {
                let mut inner = self.inner.lock().await;
                if !self.is_torn_down() {
                    self.surface(&mut inner, &err);
                    self.publish(&inner);
                }
                ActionOutcome::Failed
            }
        }
    }

    pub async fn restart(&self) -> ActionOutcome {
        if !self.prompt.confirm(messages::CONFIRM_RESTART).await {
            return ActionOutcome::Cancelled;
        }
        info!("restarting base");
        let result = self.api.reboot_base().await;
        self.settle(result).await
    }

    pub async fn shutdown(&self) -> ActionOutcome {
        if !self.prompt.confirm(messages::CONFIRM_SHUTDOWN).await {
            return ActionOutcome::Cancelled;
        }
        info!("shutting down base");
        let result = self.api.shutdown_base().await;
        self.settle(result).await
    }

    /// Starts a base update, showing the update screen before the request resolves.
    pub async fn update_base(&self, version: &str) -> ActionOutcome {
        let pending = {
            let mut inner = self.inner.lock().await;
            let pending = inner.tracker.begin_update(version);
            self.publish(&inner);
            pending
        };
        info!(version = pending.version(), "starting base update");

        let result = self.api.update_base(version).await;

        let mut inner = self.inner.lock().await;
        if self.is_torn_down() {
            return detached_outcome(&result);
        }
        let outcome = match inner.tracker.settle_update(pending, result) {
            Ok(()) => ActionOutcome::Completed,
            Err(err) => {
                self.surface(&mut inner, &err);
                ActionOutcome::Failed
            }
        };
        self.publish(&inner);
        outcome
    }

    pub async fn toggle_tor(&self, enable: bool) -> ActionOutcome {
        let currently_enabled = self.props.borrow().base_info.is_tor_enabled;
        if !self
            .prompt
            .confirm(messages::confirm_tor(currently_enabled))
            .await
        {
            return ActionOutcome::Cancelled;
        }

        {
            let mut inner = self.inner.lock().await;
            inner.wait_dialog = Some(WaitDialog {
                title: messages::APPLYING.to_string(),
                text: messages::SERVICES_RESTARTING.to_string(),
            });
            self.publish(&inner);
        }
        info!(enable, "toggling tor");

        let result = self.api.enable_tor(enable).await;

        let mut inner = self.inner.lock().await;
        if self.is_torn_down() {
            return detached_outcome(&result);
        }
        inner.wait_dialog = None;
        let outcome = match result {
            Ok(()) => {
                inner.expanded_tor_address = false;
                self.host.get_base_info();
                ActionOutcome::Completed
            }
            Err(err) => {
                self.surface(&mut inner, &err);
                ActionOutcome::Failed
            }
        };
        self.publish(&inner);
        outcome
    }

    /// Opens the Tor dialog when Tor is on, otherwise offers to enable it.
    pub async fn tor_entry_clicked(&self) -> ActionOutcome {
        let tor_enabled = self.props.borrow().base_info.is_tor_enabled;
        if tor_enabled {
            self.toggle_expanded_tor_address().await;
            ActionOutcome::Completed
        } else {
            self.toggle_tor(true).await
        }
    }

    pub async fn toggle_expanded_tor_address(&self) {
        let mut inner = self.inner.lock().await;
        inner.expanded_tor_address = !inner.expanded_tor_address;
        self.publish(&inner);
    }

    pub async fn toggle_expanded_dashboard(&self) {
        let mut inner = self.inner.lock().await;
        inner.expanded_dashboard = !inner.expanded_dashboard;
        self.publish(&inner);
    }

    pub async fn disconnect(&self) -> ActionOutcome {
        if !self.prompt.confirm(messages::CONFIRM_DISCONNECT).await {
            return ActionOutcome::Cancelled;
        }
        info!("disconnecting from base");
        self.host.disconnect();
        ActionOutcome::Completed
    }

    pub fn connect_electrum(&self) -> ActionOutcome {
        if !self.electrum_connect_enabled {
            debug!("electrum connect is disabled");
            return ActionOutcome::Unavailable;
        }
        self.host.connect_electrum();
        ActionOutcome::Completed
    }

    /// Drains surfaced notices so each is presented once. Publishes only when
    /// something was drained.
    pub async fn take_notices(&self) -> Vec<Notice> {
        let mut inner = self.inner.lock().await;
        let notices = std::mem::take(&mut inner.notices);
        if !notices.is_empty() {
            self.publish(&inner);
        }
        notices
    }
}

/// Outcome of a request that resolved after unmount; state is left alone.
fn detached_outcome(result: &Result<(), RequestError>) -> ActionOutcome {
    match result {
        Ok(()) => ActionOutcome::Completed,
        Err(_) => ActionOutcome::Failed,
    }
}

/// Keeps a [`SettingsController`] mounted; unmounts on drop.
pub struct MountGuard {
    controller: Arc<SettingsController>,
    listener: Option<JoinHandle<()>>,
    release: ReleaseHandle,
}

impl MountGuard {
    pub fn controller(&self) -> &Arc<SettingsController> {
        &self.controller
    }

    pub fn unmount(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        let Some(listener) = self.listener.take() else {
            return;
        };
        self.controller.torn_down.store(true, Ordering::SeqCst);
        listener.abort();
        self.release.unsubscribe();
        info!("unmounted settings controller");
    }
}

impl Drop for MountGuard {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
