//! Throttling of outward state snapshots.

use std::time::Duration;

use savings_arcade_core::{RunStatus, RuntimeState};

/// Limits how often state snapshots are published to observers.
///
/// A snapshot is published on the first offer, whenever the run status
/// changes, and otherwise once at least `interval` of simulated time has
/// passed since the previous publication.
#[derive(Debug)]
pub struct SnapshotThrottle {
    interval: Duration,
    since_last: Duration,
    last_status: Option<RunStatus>,
    pending: Option<RuntimeState>,
}

impl SnapshotThrottle {
    /// Creates a throttle with the provided minimum spacing.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            since_last: Duration::ZERO,
            last_status: None,
            pending: None,
        }
    }

    /// Offers the latest state after `dt` of simulated time. Returns whether it was published.
    pub fn offer(&mut self, state: &RuntimeState, dt: Duration) -> bool {
        self.since_last = self.since_last.saturating_add(dt);
        let status_changed = self.last_status != Some(state.status);
        if !status_changed && self.since_last < self.interval {
            return false;
        }

        self.since_last = Duration::ZERO;
        self.last_status = Some(state.status);
        self.pending = Some(state.clone());
        true
    }

    /// Takes the most recently published snapshot, if it has not been taken yet.
    pub fn take(&mut self) -> Option<RuntimeState> {
        self.pending.take()
    }
}
