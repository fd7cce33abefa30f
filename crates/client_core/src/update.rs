//! Reconciles fetched update-progress snapshots with the local "updating" flag.

use std::str::FromStr;

use serde::Deserialize;
use shared::{
    error::RequestError,
    protocol::{UpdateProgress, UpdateState},
};

/// Whether the view shows the update screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Updating {
    /// No update observed or started yet.
    #[default]
    Unset,
    Active,
    Inactive,
}

impl Updating {
    pub fn is_active(self) -> bool {
        self == Self::Active
    }
}

/// How completions of overlapping progress fetches are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProgressOrdering {
    /// Snapshots from fetches issued before the last applied one are dropped.
    #[default]
    Sequenced,
    /// Whichever fetch completes last wins.
    LastWriteWins,
}

impl FromStr for ProgressOrdering {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequenced" => Ok(Self::Sequenced),
            "last-write-wins" => Ok(Self::LastWriteWins),
            other => Err(format!("unknown progress ordering {other}")),
        }
    }
}

/// Issue order of a progress fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    Applied { entered_update: bool },
    /// A newer snapshot was already applied.
    Stale,
    Failed(RequestError),
}

/// Proof that an optimistic update start is waiting for its response.
#[must_use]
#[derive(Debug)]
pub struct PendingUpdate {
    version: String,
}

impl PendingUpdate {
    pub fn version(&self) -> &str {
        &self.version
    }
}

#[derive(Debug, Clone)]
pub struct UpdateTracker {
    ordering: ProgressOrdering,
    updating: Updating,
    progress: UpdateProgress,
    issued: u64,
    applied: Option<FetchTicket>,
}

impl UpdateTracker {
    pub fn new(ordering: ProgressOrdering) -> Self {
        Self {
            ordering,
            updating: Updating::Unset,
            progress: UpdateProgress::default(),
            issued: 0,
            applied: None,
        }
    }

    pub fn updating(&self) -> Updating {
        self.updating
    }

    pub fn progress(&self) -> UpdateProgress {
        self.progress
    }

    pub fn issue_fetch(&mut self) -> FetchTicket {
        self.issued += 1;
        FetchTicket(self.issued)
    }

    /// Applies the outcome of the fetch identified by `ticket`.
    ///
    /// Failures never touch local state. A `Failed` snapshot replaces the
    /// progress but does not switch the view into update mode.
    pub fn apply_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<UpdateProgress, RequestError>,
    ) -> Reconciliation {
        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(err) => return Reconciliation::Failed(err),
        };

        if self.ordering == ProgressOrdering::Sequenced
            && self.applied.is_some_and(|applied| ticket <= applied)
        {
            return Reconciliation::Stale;
        }

        let entered_update =
            !self.updating.is_active() && snapshot.state != UpdateState::Failed;
        if entered_update {
            self.updating = Updating::Active;
        }
        self.progress = snapshot;
        self.applied = Some(ticket);
        Reconciliation::Applied { entered_update }
    }

    /// Optimistically enters update mode before the start request resolves.
    pub fn begin_update(&mut self, version: impl Into<String>) -> PendingUpdate {
        self.updating = Updating::Active;
        PendingUpdate {
            version: version.into(),
        }
    }

    /// Confirms or reverts a [`PendingUpdate`].
    pub fn settle_update(
        &mut self,
        pending: PendingUpdate,
        result: Result<(), RequestError>,
    ) -> Result<(), RequestError> {
        let PendingUpdate { .. } = pending;
        if result.is_err() {
            self.updating = Updating::Inactive;
        }
        result
    }
}

impl Default for UpdateTracker {
    fn default() -> Self {
        Self::new(ProgressOrdering::default())
    }
}

#[cfg(test)]
#[path = "tests/update_tests.rs"]
mod tests;
