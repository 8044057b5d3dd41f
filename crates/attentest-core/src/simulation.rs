//! Simulated participant.
//!
//! Drives any [`AttentionTest`] through a complete session on a
//! [`ManualClock`], so a full 20-minute protocol runs in milliseconds.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::classifier::ResponseOutcome;
use crate::clock::{Clock, ManualClock};
use crate::error::SessionError;
use crate::model::SessionStatus;
use crate::results::SessionResults;
use crate::traits::AttentionTest;

/// How a simulated participant behaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponderProfile {
    /// Probability of responding to a target.
    pub hit_probability: f64,
    /// Probability of responding to a non-target.
    pub false_alarm_probability: f64,
    pub mean_rt_ms: f64,
    /// Latencies are drawn uniformly from `mean ± jitter`.
    pub rt_jitter_ms: f64,
}

impl ResponderProfile {
    pub fn attentive() -> Self {
        Self {
            hit_probability: 0.95,
            false_alarm_probability: 0.04,
            mean_rt_ms: 380.0,
            rt_jitter_ms: 60.0,
        }
    }

    pub fn inattentive() -> Self {
        Self {
            hit_probability: 0.6,
            false_alarm_probability: 0.12,
            mean_rt_ms: 540.0,
            rt_jitter_ms: 160.0,
        }
    }

    /// Fast, with frequent false alarms and some anticipatory presses.
    pub fn impulsive() -> Self {
        Self {
            hit_probability: 0.92,
            false_alarm_probability: 0.35,
            mean_rt_ms: 260.0,
            rt_jitter_ms: 140.0,
        }
    }

    fn sample_latency<R: Rng>(&self, rng: &mut R, max: Duration) -> Duration {
        let jitter = self.rt_jitter_ms.abs();
        let ms = self.mean_rt_ms + rng.random_range(-jitter..=jitter);
        let ms = ms.clamp(1.0, (max.as_secs_f64() * 1000.0 - 1.0).max(1.0));
        Duration::from_secs_f64(ms / 1000.0)
    }
}

impl Default for ResponderProfile {
    fn default() -> Self {
        Self::attentive()
    }
}

impl FromStr for ResponderProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "attentive" => Ok(Self::attentive()),
            "inattentive" => Ok(Self::inattentive()),
            "impulsive" => Ok(Self::impulsive()),
            other => Err(format!(
                "unknown profile: {other} (expected attentive, inattentive or impulsive)"
            )),
        }
    }
}

/// Progress callbacks from a simulated session.
pub trait SessionObserver {
    fn on_stimulus(&self, index: u32, phase_label: &str, stimulus: &dyn fmt::Display);
    fn on_response(&self, outcome: &ResponseOutcome);
    fn on_tick(&self, remaining_secs: f64);
}

/// Observer that ignores everything.
pub struct NoopObserver;

impl SessionObserver for NoopObserver {
    fn on_stimulus(&self, _: u32, _: &str, _: &dyn fmt::Display) {}
    fn on_response(&self, _: &ResponseOutcome) {}
    fn on_tick(&self, _: f64) {}
}

/// Run a full session.
///
/// Each trial presents a stimulus, maybe responds after a sampled latency,
/// advances the clock to the end of the stimulus interval and closes the
/// response window. `check_time_remaining` is called once per elapsed
/// whole second, which triggers phase switches and the end of the test.
pub fn run_simulated_session<T, R>(
    engine: &mut T,
    clock: &ManualClock,
    profile: &ResponderProfile,
    rng: &mut R,
    observer: &dyn SessionObserver,
) -> Result<SessionResults, SessionError>
where
    T: AttentionTest,
    R: Rng,
{
    engine.start();
    let interval = engine.timings().inter_stimulus_interval;
    let origin = clock.now();
    let mut next_check = Duration::from_secs(1);
    let mut index = 0u32;

    while engine.status() == SessionStatus::Running {
        let Some(stimulus) = engine.generate_stimulus() else {
            break;
        };
        index += 1;
        observer.on_stimulus(index, &engine.phase_label(), &stimulus);

        let onset = clock.now();
        let respond_probability = if engine.current_is_target() {
            profile.hit_probability
        } else {
            profile.false_alarm_probability
        };
        if rng.random::<f64>() < respond_probability {
            clock.set(onset + profile.sample_latency(rng, interval));
            let outcome = engine.process_response();
            observer.on_response(&outcome);
        }

        clock.set(onset + interval);
        engine.end_response_window();

        while origin + next_check <= clock.now() && engine.status() == SessionStatus::Running {
            let remaining = engine.check_time_remaining();
            observer.on_tick(remaining);
            next_check += Duration::from_secs(1);
        }
    }

    tracing::debug!(stimuli = index, "simulated session complete");
    match engine.status() {
        SessionStatus::Running => engine.end_test(),
        _ => engine.results().cloned().ok_or(SessionError::NotStarted),
    }
}
