//! Per-phase trial counters and the correct-response latency series.
//!
//! A phase's state lives in one [`PhaseState`] value. Phase boundaries swap it
//! out wholesale, so no field can survive a reset by accident.

use serde::{Deserialize, Serialize};

/// Integer trial counts for the active phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseCounters {
    pub stimuli_shown: u32,
    pub target_stimuli: u32,
    pub non_target_stimuli: u32,
    pub correct_responses: u32,
    /// Responses to non-targets (false alarms).
    pub commission_errors: u32,
    /// Targets left unanswered. Recomputed at finalize.
    pub omission_errors: u32,
    /// Responses faster than the anticipatory threshold (TOVA).
    #[serde(default)]
    pub anticipatory_responses: u32,
    /// Extra presses on a stimulus that was already answered.
    #[serde(default)]
    pub multiple_responses: u32,
    /// Commission errors directly following another commission error (TOVA).
    #[serde(default)]
    pub post_commission_errors: u32,
}

impl PhaseCounters {
    /// Count a newly presented stimulus.
    pub fn record_stimulus(&mut self, is_target: bool) {
        self.stimuli_shown += 1;
        if is_target {
            self.target_stimuli += 1;
        } else {
            self.non_target_stimuli += 1;
        }
    }

    /// Targets minus correct responses, never negative.
    pub fn expected_omissions(&self) -> u32 {
        self.target_stimuli.saturating_sub(self.correct_responses)
    }

    /// Overwrite the omission count with [`expected_omissions`](Self::expected_omissions).
    ///
    /// Returns the previous (live) count.
    pub fn recompute_omissions(&mut self) -> u32 {
        let expected = self.expected_omissions();
        std::mem::replace(&mut self.omission_errors, expected)
    }

    pub fn hit_rate(&self) -> f64 {
        ratio(self.correct_responses, self.target_stimuli)
    }

    pub fn false_alarm_rate(&self) -> f64 {
        ratio(self.commission_errors, self.non_target_stimuli)
    }

    pub fn omission_rate(&self) -> f64 {
        ratio(self.omission_errors, self.target_stimuli)
    }
}

fn ratio(count: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

/// Latencies in milliseconds of correct responses, in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseTimeSeries(Vec<f64>);

impl ResponseTimeSeries {
    pub fn push(&mut self, latency_ms: f64) {
        self.0.push(latency_ms);
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.0
    }
}

impl From<Vec<f64>> for ResponseTimeSeries {
    fn from(v: Vec<f64>) -> Self {
        Self(v)
    }
}

/// Everything that resets at a phase boundary.
#[derive(Debug, Clone, Default)]
pub struct PhaseState {
    pub counters: PhaseCounters,
    pub response_times: ResponseTimeSeries,
}

impl PhaseState {
    /// Take the accumulated state, leaving a zeroed phase behind.
    pub fn take(&mut self) -> PhaseState {
        std::mem::take(self)
    }
}
