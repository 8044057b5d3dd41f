//! Test of Variables of Attention.
//!
//! Two phases of equal length: targets are infrequent in the first half and
//! frequent in the second. Each stimulus opens a response window which the
//! caller closes with [`AttentionTest::end_response_window`]; a target whose
//! window closes unanswered is an omission.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::classifier::{classify_tova, IgnoreReason, ResponseOutcome, TovaResponse};
use crate::clock::{Clock, SystemClock};
use crate::config::{TestTimings, TovaConfig};
use crate::counters::{PhaseCounters, PhaseState};
use crate::error::{ConfigError, SessionError};
use crate::model::{ParticipantInfo, PhaseId, SessionStatus, TestKind, TovaStimulus};
use crate::results::{PhaseResult, SessionResults};
use crate::session::SessionState;
use crate::traits::AttentionTest;

/// Two-phase TOVA engine.
pub struct TovaEngine<C: Clock, R: Rng> {
    config: TovaConfig,
    clock: C,
    rng: R,
    active: PhaseId,
    session: SessionState,
    phase: PhaseState,
    current: Option<TovaStimulus>,
    /// Responses to the current stimulus.
    response_count: u32,
    window_open: bool,
    /// The previous classified response was a commission error.
    last_was_commission: bool,
    participant: ParticipantInfo,
    results: Option<SessionResults>,
}

impl<C: Clock, R: Rng> TovaEngine<C, R> {
    pub fn new(config: TovaConfig, clock: C, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            clock,
            rng,
            active: PhaseId::InfrequentTargets,
            session: SessionState::default(),
            phase: PhaseState::default(),
            current: None,
            response_count: 0,
            window_open: false,
            last_was_commission: false,
            participant: ParticipantInfo::default(),
            results: None,
        })
    }

    pub fn config(&self) -> &TovaConfig {
        &self.config
    }

    pub fn counters(&self) -> &PhaseCounters {
        &self.phase.counters
    }

    pub fn active_phase(&self) -> PhaseId {
        self.active
    }

    pub fn current_stimulus(&self) -> Option<TovaStimulus> {
        self.current
    }

    pub fn is_window_open(&self) -> bool {
        self.window_open
    }

    fn target_ratio(&self) -> f64 {
        match self.active {
            PhaseId::FrequentTargets => self.config.frequent_ratio,
            _ => self.config.infrequent_ratio,
        }
    }

    fn close_window(&mut self) {
        if !self.window_open {
            return;
        }
        self.window_open = false;
        if self.current == Some(TovaStimulus::Target) && self.response_count == 0 {
            self.phase.counters.omission_errors += 1;
            tracing::debug!(phase = %self.active, "omission");
        }
    }

    /// Close any open window and reduce the active phase.
    fn finalize_active(&mut self) -> PhaseResult {
        self.close_window();
        let counters = &self.phase.counters;
        let expected = counters.expected_omissions();
        if counters.omission_errors != expected {
            tracing::warn!(
                phase = %self.active,
                live = counters.omission_errors,
                expected,
                "live omission count disagrees with targets minus correct responses"
            );
        }
        PhaseResult::finalize(self.phase.take(), true)
    }

    fn switch_to_frequent(&mut self) {
        let infrequent = self.finalize_active();
        tracing::info!(
            acs = infrequent.acs_score,
            d_prime = infrequent.d_prime,
            "switching to frequent targets"
        );
        if let Some(results) = self.results.as_mut() {
            results.record_phase(PhaseId::InfrequentTargets, infrequent);
        }
        self.active = PhaseId::FrequentTargets;
        self.current = None;
        self.response_count = 0;
        self.last_was_commission = false;
        self.session.clear_stimulus();
    }

    fn finish(&mut self) -> SessionResults {
        let result = self.finalize_active();
        self.session.end();
        tracing::info!(
            phase = %self.active,
            acs = result.acs_score,
            d_prime = result.d_prime,
            "TOVA ended"
        );

        let mut results = self
            .results
            .take()
            .unwrap_or_else(|| SessionResults::new(TestKind::Tova, self.participant.clone()));
        results.record_phase(self.active, result);
        results.ended_at = Some(Utc::now());
        self.results = Some(results.clone());
        results
    }
}

impl<C: Clock> TovaEngine<C, StdRng> {
    pub fn seeded(config: TovaConfig, clock: C, seed: u64) -> Result<Self, ConfigError> {
        Self::new(config, clock, StdRng::seed_from_u64(seed))
    }
}

impl TovaEngine<SystemClock, StdRng> {
    pub fn with_system_clock(config: TovaConfig) -> Result<Self, ConfigError> {
        Self::new(config, SystemClock::new(), StdRng::from_os_rng())
    }
}

impl<C: Clock, R: Rng> AttentionTest for TovaEngine<C, R> {
    type Stimulus = TovaStimulus;

    fn kind(&self) -> TestKind {
        TestKind::Tova
    }

    fn timings(&self) -> TestTimings {
        self.config.timings()
    }

    fn status(&self) -> SessionStatus {
        self.session.status()
    }

    fn set_participant(&mut self, participant: ParticipantInfo) {
        if let Some(results) = self.results.as_mut().filter(|r| !r.is_finished()) {
            results.participant = participant.clone();
        }
        self.participant = participant;
    }

    fn start(&mut self) {
        let midpoint = self.config.timings().midpoint();
        self.session.start(self.clock.now(), Some(midpoint));
        self.active = PhaseId::InfrequentTargets;
        self.phase = PhaseState::default();
        self.current = None;
        self.response_count = 0;
        self.window_open = false;
        self.last_was_commission = false;
        self.results = Some(SessionResults::new(TestKind::Tova, self.participant.clone()));
        tracing::info!(duration_secs = self.config.duration_secs, "TOVA started");
    }

    fn generate_stimulus(&mut self) -> Option<TovaStimulus> {
        if !self.session.is_running() {
            return None;
        }
        // The caller may skip end_response_window; the previous window
        // still has to be scored before it is replaced.
        self.close_window();

        let stimulus = if self.rng.random::<f64>() < self.target_ratio() {
            TovaStimulus::Target
        } else {
            TovaStimulus::NonTarget
        };

        self.phase
            .counters
            .record_stimulus(stimulus == TovaStimulus::Target);
        self.session.mark_stimulus(self.clock.now());
        self.current = Some(stimulus);
        self.response_count = 0;
        self.window_open = true;
        tracing::debug!(%stimulus, phase = %self.active, "stimulus");
        Some(stimulus)
    }

    /// Responses are credited to the current stimulus even after its window
    /// has closed, until the next stimulus replaces it.
    fn process_response(&mut self) -> ResponseOutcome {
        if !self.session.is_running() {
            return ResponseOutcome::Ignored(IgnoreReason::NotRunning);
        }
        let now = self.clock.now();
        if self.session.is_debounced(now, self.config.timings().debounce) {
            return ResponseOutcome::Ignored(IgnoreReason::Debounced);
        }
        let (Some(stimulus), Some(latency)) = (self.current, self.session.latency(now)) else {
            return ResponseOutcome::Ignored(IgnoreReason::NoStimulus);
        };

        self.response_count += 1;
        let outcome = classify_tova(&TovaResponse {
            stimulus,
            response_count: self.response_count,
            latency,
            anticipatory_threshold: self.config.anticipatory_threshold(),
            follows_commission: self.last_was_commission,
        });
        match outcome {
            ResponseOutcome::Commission { .. } => self.last_was_commission = true,
            ResponseOutcome::Hit { .. } | ResponseOutcome::Anticipatory { .. } => {
                self.last_was_commission = false
            }
            ResponseOutcome::Repeat | ResponseOutcome::Ignored(_) => {}
        }

        self.session.accept_response(now);
        outcome.apply(&mut self.phase);
        tracing::debug!(?outcome, phase = %self.active, "response");
        outcome
    }

    fn check_time_remaining(&mut self) -> f64 {
        if !self.session.is_running() {
            return 0.0;
        }
        let now = self.clock.now();
        if self.active == PhaseId::InfrequentTargets && self.session.take_due_switch(now) {
            self.switch_to_frequent();
        }
        let remaining = self
            .session
            .remaining(now, self.config.timings().test_duration);
        if remaining.is_zero() {
            self.finish();
        }
        remaining.as_secs_f64()
    }

    fn end_response_window(&mut self) {
        if self.session.is_running() {
            self.close_window();
        }
    }

    fn end_test(&mut self) -> Result<SessionResults, SessionError> {
        match self.session.status() {
            SessionStatus::Idle => Err(SessionError::NotStarted),
            SessionStatus::Ended => Err(SessionError::AlreadyEnded),
            SessionStatus::Running => Ok(self.finish()),
        }
    }

    fn results(&self) -> Option<&SessionResults> {
        self.results.as_ref()
    }

    fn current_is_target(&self) -> bool {
        self.current == Some(TovaStimulus::Target)
    }

    fn phase_label(&self) -> String {
        let name = match self.active {
            PhaseId::FrequentTargets => "Frequent",
            _ => "Infrequent",
        };
        format!("{name} Targets ({:.1}%)", self.target_ratio() * 100.0)
    }
}
