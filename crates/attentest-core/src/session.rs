//! Lifecycle and timing state shared by the three engines.

use std::time::Duration;

use crate::model::SessionStatus;

/// Status, start time, phase-switch deadline, current stimulus onset and
/// debounce bookkeeping for one session.
///
/// All instants are readings of the engine's [`Clock`](crate::clock::Clock).
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    status: SessionStatus,
    started_at: Option<Duration>,
    phase_switch_at: Option<Duration>,
    stimulus_onset: Option<Duration>,
    last_accepted_response: Option<Duration>,
}

impl SessionState {
    /// Reset everything and enter [`SessionStatus::Running`].
    ///
    /// `switch_after` schedules a phase switch relative to `now`.
    pub fn start(&mut self, now: Duration, switch_after: Option<Duration>) {
        *self = Self {
            status: SessionStatus::Running,
            started_at: Some(now),
            phase_switch_at: switch_after.map(|d| now + d),
            stimulus_onset: None,
            last_accepted_response: None,
        };
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == SessionStatus::Running
    }

    /// Freeze the session.
    pub fn end(&mut self) {
        self.status = SessionStatus::Ended;
        self.phase_switch_at = None;
    }

    pub fn elapsed(&self, now: Duration) -> Duration {
        self.started_at
            .map(|start| now.saturating_sub(start))
            .unwrap_or_default()
    }

    /// Time left before `total` has elapsed.
    pub fn remaining(&self, now: Duration, total: Duration) -> Duration {
        total.saturating_sub(self.elapsed(now))
    }

    /// Returns true once, when the scheduled phase switch is due.
    pub fn take_due_switch(&mut self, now: Duration) -> bool {
        match self.phase_switch_at {
            Some(at) if now >= at => {
                self.phase_switch_at = None;
                true
            }
            _ => false,
        }
    }

    pub fn mark_stimulus(&mut self, now: Duration) {
        self.stimulus_onset = Some(now);
    }

    /// Forget the current stimulus; responses are ignored until the next one.
    pub fn clear_stimulus(&mut self) {
        self.stimulus_onset = None;
    }

    pub fn has_stimulus(&self) -> bool {
        self.stimulus_onset.is_some()
    }

    /// Time since the current stimulus appeared.
    pub fn latency(&self, now: Duration) -> Option<Duration> {
        self.stimulus_onset.map(|onset| now.saturating_sub(onset))
    }

    /// Whether a response at `now` falls inside the debounce window of the
    /// previously accepted response.
    pub fn is_debounced(&self, now: Duration, window: Duration) -> bool {
        self.last_accepted_response
            .is_some_and(|last| now.saturating_sub(last) < window)
    }

    pub fn accept_response(&mut self, now: Duration) {
        self.last_accepted_response = Some(now);
    }
}
