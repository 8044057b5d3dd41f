//! Continuous Performance Task: respond to the target letter, withhold for
//! every other letter.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::classifier::{classify_match, IgnoreReason, ResponseOutcome};
use crate::clock::{Clock, SystemClock};
use crate::config::{CptConfig, TestTimings};
use crate::counters::{PhaseCounters, PhaseState};
use crate::error::{ConfigError, SessionError};
use crate::model::{ParticipantInfo, PhaseId, SessionStatus, TestKind};
use crate::results::{PhaseResult, SessionResults};
use crate::session::SessionState;
use crate::traits::AttentionTest;

/// Single-phase CPT engine.
pub struct CptEngine<C: Clock, R: Rng> {
    config: CptConfig,
    clock: C,
    rng: R,
    /// Every uppercase letter except the target.
    distractors: Vec<char>,
    session: SessionState,
    phase: PhaseState,
    current: Option<char>,
    /// The current target already has its correct response.
    credited: bool,
    participant: ParticipantInfo,
    results: Option<SessionResults>,
}

impl<C: Clock, R: Rng> CptEngine<C, R> {
    pub fn new(config: CptConfig, clock: C, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let distractors = ('A'..='Z').filter(|c| *c != config.target_symbol).collect();
        Ok(Self {
            config,
            clock,
            rng,
            distractors,
            session: SessionState::default(),
            phase: PhaseState::default(),
            current: None,
            credited: false,
            participant: ParticipantInfo::default(),
            results: None,
        })
    }

    pub fn config(&self) -> &CptConfig {
        &self.config
    }

    /// Live counters of the running phase.
    pub fn counters(&self) -> &PhaseCounters {
        &self.phase.counters
    }

    pub fn current_stimulus(&self) -> Option<char> {
        self.current
    }

    fn finish(&mut self) -> SessionResults {
        self.session.end();
        let result = PhaseResult::finalize(self.phase.take(), false);
        tracing::info!(
            hit_rate = result.hit_rate,
            d_prime = result.d_prime,
            "CPT ended"
        );

        let mut results = self
            .results
            .take()
            .unwrap_or_else(|| SessionResults::new(TestKind::Cpt, self.participant.clone()));
        results.record_phase(PhaseId::Cpt, result);
        results.ended_at = Some(Utc::now());
        self.results = Some(results.clone());
        results
    }
}

impl<C: Clock> CptEngine<C, StdRng> {
    /// Engine with a reproducible stimulus sequence.
    pub fn seeded(config: CptConfig, clock: C, seed: u64) -> Result<Self, ConfigError> {
        Self::new(config, clock, StdRng::seed_from_u64(seed))
    }
}

impl CptEngine<SystemClock, StdRng> {
    pub fn with_system_clock(config: CptConfig) -> Result<Self, ConfigError> {
        Self::new(config, SystemClock::new(), StdRng::from_os_rng())
    }
}

impl<C: Clock, R: Rng> AttentionTest for CptEngine<C, R> {
    type Stimulus = char;

    fn kind(&self) -> TestKind {
        TestKind::Cpt
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
        self.session.start(self.clock.now(), None);
        self.phase = PhaseState::default();
        self.current = None;
        self.credited = false;
        self.results = Some(SessionResults::new(TestKind::Cpt, self.participant.clone()));
        tracing::info!(
            duration_secs = self.config.duration_secs,
            target = %self.config.target_symbol,
            "CPT started"
        );
    }

    fn generate_stimulus(&mut self) -> Option<char> {
        if !self.session.is_running() {
            return None;
        }

        let is_target = self.rng.random::<f64>() < self.config.target_ratio;
        let stimulus = if is_target {
            self.config.target_symbol
        } else {
            self.distractors[self.rng.random_range(0..self.distractors.len())]
        };

        self.phase.counters.record_stimulus(is_target);
        self.session.mark_stimulus(self.clock.now());
        self.current = Some(stimulus);
        self.credited = false;
        tracing::debug!(%stimulus, is_target, "stimulus");
        Some(stimulus)
    }

    fn process_response(&mut self) -> ResponseOutcome {
        if !self.session.is_running() {
            return ResponseOutcome::Ignored(IgnoreReason::NotRunning);
        }
        let now = self.clock.now();
        if self.session.is_debounced(now, self.config.timings().debounce) {
            return ResponseOutcome::Ignored(IgnoreReason::Debounced);
        }
        let Some(latency) = self.session.latency(now) else {
            return ResponseOutcome::Ignored(IgnoreReason::NoStimulus);
        };

        let outcome = classify_match(self.current_is_target(), self.credited, latency);
        if matches!(outcome, ResponseOutcome::Hit { .. }) {
            self.credited = true;
        }
        self.session.accept_response(now);
        outcome.apply(&mut self.phase);
        tracing::debug!(?outcome, "response");
        outcome
    }

    fn check_time_remaining(&mut self) -> f64 {
        if !self.session.is_running() {
            return 0.0;
        }
        let remaining = self
            .session
            .remaining(self.clock.now(), self.config.timings().test_duration);
        if remaining.is_zero() {
            self.finish();
        }
        remaining.as_secs_f64()
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
        self.current == Some(self.config.target_symbol)
    }

    fn phase_label(&self) -> String {
        PhaseId::Cpt.title().to_string()
    }
}
