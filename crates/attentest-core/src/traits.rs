//! The trait every test engine implements.
//!
//! A presentation layer (a GUI, the CLI, the simulator) owns the scheduling
//! loop and calls these operations; the engine never blocks and owns no timer.

use std::fmt;

use crate::classifier::ResponseOutcome;
use crate::config::TestTimings;
use crate::error::SessionError;
use crate::model::{ParticipantInfo, SessionStatus, TestKind};
use crate::results::SessionResults;

/// A timed attention test.
///
/// Calls made while the engine is not running are harmless: stimulus
/// generation yields `None` and responses come back as
/// [`ResponseOutcome::Ignored`].
pub trait AttentionTest {
    /// What the presentation layer displays.
    type Stimulus: Clone + fmt::Display;

    fn kind(&self) -> TestKind;

    fn timings(&self) -> TestTimings;

    fn status(&self) -> SessionStatus;

    /// Attach participant details. They are copied unmodified into the
    /// results.
    fn set_participant(&mut self, participant: ParticipantInfo);

    /// Reset all counters, history and timestamps, then start running.
    ///
    /// Calling this again restarts the session from scratch.
    fn start(&mut self);

    /// Present the next stimulus.
    fn generate_stimulus(&mut self) -> Option<Self::Stimulus>;

    /// Record a response at the current time.
    fn process_response(&mut self) -> ResponseOutcome;

    /// Seconds left in the session.
    ///
    /// Performs any due phase switch, and ends the test once the full
    /// duration has elapsed. Meant to be called about once per second.
    fn check_time_remaining(&mut self) -> f64;

    /// Close the current stimulus's response window.
    fn end_response_window(&mut self) {}

    /// Finalize the active phase and freeze the results.
    ///
    /// Fails with [`SessionError::NotStarted`] before `start` and with
    /// [`SessionError::AlreadyEnded`] on a second call.
    fn end_test(&mut self) -> Result<SessionResults, SessionError>;

    /// Results accumulated so far, `None` before the first `start`.
    fn results(&self) -> Option<&SessionResults>;

    /// Whether the currently displayed stimulus is a target.
    fn current_is_target(&self) -> bool;

    /// Human-readable name of the active phase.
    fn phase_label(&self) -> String;
}
