//! Immediate and Delayed Memory Tasks.
//!
//! Stimuli are digit strings. In IMT a target repeats the previous stimulus;
//! in DMT it repeats the stimulus `delay` positions back. Target-ness of a
//! response is recomputed from the history when the response arrives.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::classifier::{classify_match, memory_target, IgnoreReason, ResponseOutcome};
use crate::clock::{Clock, SystemClock};
use crate::config::{MemoryConfig, TestTimings};
use crate::counters::{PhaseCounters, PhaseState};
use crate::error::{ConfigError, SessionError};
use crate::model::{MemoryMode, ParticipantInfo, PhaseId, SessionStatus, TestKind};
use crate::results::{PhaseResult, SessionResults};
use crate::session::SessionState;
use crate::traits::AttentionTest;

/// IMT/DMT engine.
///
/// In [`MemoryMode::Both`] the session switches from IMT to DMT at its
/// midpoint. The stimulus history spans the whole session, so early DMT
/// targets may repeat stimuli shown during IMT.
pub struct MemoryEngine<C: Clock, R: Rng> {
    config: MemoryConfig,
    clock: C,
    rng: R,
    mode: MemoryMode,
    active: PhaseId,
    session: SessionState,
    phase: PhaseState,
    history: Vec<String>,
    credited: bool,
    participant: ParticipantInfo,
    results: Option<SessionResults>,
}

impl<C: Clock, R: Rng> MemoryEngine<C, R> {
    pub fn new(config: MemoryConfig, clock: C, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            mode: config.mode,
            active: initial_phase(config.mode),
            config,
            clock,
            rng,
            session: SessionState::default(),
            phase: PhaseState::default(),
            history: Vec::new(),
            credited: false,
            participant: ParticipantInfo::default(),
            results: None,
        })
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    pub fn counters(&self) -> &PhaseCounters {
        &self.phase.counters
    }

    pub fn mode(&self) -> MemoryMode {
        self.mode
    }

    pub fn active_phase(&self) -> PhaseId {
        self.active
    }

    /// Every stimulus presented this session, oldest first.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Start in an explicit mode, overriding the configured one.
    pub fn start_with_mode(&mut self, mode: MemoryMode) {
        self.mode = mode;
        self.active = initial_phase(mode);
        let switch_after = (mode == MemoryMode::Both).then(|| self.config.timings().midpoint());
        self.session.start(self.clock.now(), switch_after);
        self.phase = PhaseState::default();
        self.history.clear();
        self.credited = false;

        let mut results = SessionResults::new(TestKind::ImtDmt, self.participant.clone());
        results.memory_mode = Some(mode);
        self.results = Some(results);
        tracing::info!(%mode, duration_secs = self.config.duration_secs, "IMT/DMT started");
    }

    /// Positions back a target repeats in the active phase.
    fn lookback(&self) -> usize {
        match self.active {
            PhaseId::Dmt => self.config.delay,
            _ => 1,
        }
    }

    /// A random digit string that does not match the look-back entry.
    fn fresh_stimulus(&mut self, avoid: Option<&str>) -> String {
        loop {
            let candidate: String = (0..self.config.stimulus_length)
                .map(|_| char::from(b'0' + self.rng.random_range(0..10u8)))
                .collect();
            if avoid != Some(candidate.as_str()) {
                return candidate;
            }
        }
    }

    fn switch_to_dmt(&mut self) {
        let imt = PhaseResult::finalize(self.phase.take(), false);
        tracing::info!(
            hit_rate = imt.hit_rate,
            d_prime = imt.d_prime,
            "switching from IMT to DMT"
        );
        if let Some(results) = self.results.as_mut() {
            results.record_phase(PhaseId::Imt, imt);
        }
        self.active = PhaseId::Dmt;
        self.session.clear_stimulus();
        self.credited = false;
    }

    fn finish(&mut self) -> SessionResults {
        self.session.end();
        let result = PhaseResult::finalize(self.phase.take(), false);
        tracing::info!(
            phase = %self.active,
            hit_rate = result.hit_rate,
            d_prime = result.d_prime,
            "IMT/DMT ended"
        );

        let mut results = self.results.take().unwrap_or_else(|| {
            SessionResults::new(TestKind::ImtDmt, self.participant.clone())
        });
        results.record_phase(self.active, result);
        for id in [PhaseId::Imt, PhaseId::Dmt] {
            results.record_phase(id, PhaseResult::empty());
        }
        results.ended_at = Some(Utc::now());
        self.results = Some(results.clone());
        results
    }
}

fn initial_phase(mode: MemoryMode) -> PhaseId {
    match mode {
        MemoryMode::Dmt => PhaseId::Dmt,
        MemoryMode::Imt | MemoryMode::Both => PhaseId::Imt,
    }
}

impl<C: Clock> MemoryEngine<C, StdRng> {
    pub fn seeded(config: MemoryConfig, clock: C, seed: u64) -> Result<Self, ConfigError> {
        Self::new(config, clock, StdRng::seed_from_u64(seed))
    }
}

impl MemoryEngine<SystemClock, StdRng> {
    pub fn with_system_clock(config: MemoryConfig) -> Result<Self, ConfigError> {
        Self::new(config, SystemClock::new(), StdRng::from_os_rng())
    }
}

impl<C: Clock, R: Rng> AttentionTest for MemoryEngine<C, R> {
    type Stimulus = String;

    fn kind(&self) -> TestKind {
        TestKind::ImtDmt
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
        self.start_with_mode(self.config.mode);
    }

    fn generate_stimulus(&mut self) -> Option<String> {
        if !self.session.is_running() {
            return None;
        }

        let lookback = self.lookback();
        let source = self
            .history
            .len()
            .checked_sub(lookback)
            .map(|i| self.history[i].clone());
        let wants_target = self.rng.random::<f64>() < self.config.target_probability;

        let (stimulus, is_target) = match source {
            Some(repeat) if wants_target => (repeat, true),
            // Not enough history for a target yet.
            source => (self.fresh_stimulus(source.as_deref()), false),
        };

        self.history.push(stimulus.clone());
        self.phase.counters.record_stimulus(is_target);
        self.session.mark_stimulus(self.clock.now());
        self.credited = false;
        tracing::debug!(%stimulus, is_target, phase = %self.active, "stimulus");
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
        tracing::debug!(?outcome, phase = %self.active, "response");
        outcome
    }

    fn check_time_remaining(&mut self) -> f64 {
        if !self.session.is_running() {
            return 0.0;
        }
        let now = self.clock.now();
        if self.active == PhaseId::Imt && self.session.take_due_switch(now) {
            self.switch_to_dmt();
        }
        let remaining = self
            .session
            .remaining(now, self.config.timings().test_duration);
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
        self.session.has_stimulus() && memory_target(&self.history, self.lookback())
    }

    fn phase_label(&self) -> String {
        match self.active {
            PhaseId::Dmt => format!("{} (Delay: {})", PhaseId::Dmt.title(), self.config.delay),
            other => other.title().to_string(),
        }
    }
}
