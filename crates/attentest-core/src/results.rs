//! Finalized phase results and the session results mapping, with JSON
//! persistence.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::counters::{PhaseCounters, PhaseState};
use crate::model::{MemoryMode, ParticipantInfo, PhaseId, TestKind};
use crate::statistics::{self, AcsComponents};

/// Immutable snapshot of one phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseResult {
    #[serde(flatten)]
    pub counters: PhaseCounters,
    pub hit_rate: f64,
    pub false_alarm_rate: f64,
    pub omission_rate: f64,
    pub d_prime: f64,
    /// Mean latency of correct responses in milliseconds.
    pub mean_rt: f64,
    pub median_rt: f64,
    /// Population standard deviation of correct-response latencies.
    pub rt_std: f64,
    /// Population variance of correct-response latencies.
    pub rt_var: f64,
    /// Attention Comparison Score, only computed for TOVA phases.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acs_score: Option<f64>,
    pub response_times: Vec<f64>,
}

impl PhaseResult {
    /// Reduce a finished phase into its result record.
    ///
    /// Omissions are recomputed as targets minus correct responses, whatever
    /// was counted live.
    pub fn finalize(phase: PhaseState, with_acs: bool) -> Self {
        let PhaseState {
            mut counters,
            response_times,
        } = phase;
        counters.recompute_omissions();

        let times = response_times.into_vec();
        let mean_rt = statistics::mean(&times);
        let rt_var = statistics::variance(&times);
        let hit_rate = counters.hit_rate();
        let false_alarm_rate = counters.false_alarm_rate();
        let d_prime = statistics::d_prime(
            hit_rate,
            false_alarm_rate,
            counters.target_stimuli,
            counters.non_target_stimuli,
        );

        let acs_score = with_acs.then(|| {
            AcsComponents::compute(
                mean_rt,
                d_prime,
                rt_var,
                false_alarm_rate,
                counters.non_target_stimuli,
            )
            .score()
        });

        Self {
            omission_rate: counters.omission_rate(),
            hit_rate,
            false_alarm_rate,
            d_prime,
            mean_rt,
            median_rt: statistics::median(&times),
            rt_std: rt_var.sqrt(),
            rt_var,
            acs_score,
            counters,
            response_times: times,
        }
    }

    /// Result for a phase that never ran: zero counts and zero metrics.
    pub fn empty() -> Self {
        Self {
            counters: PhaseCounters::default(),
            hit_rate: 0.0,
            false_alarm_rate: 0.0,
            omission_rate: 0.0,
            d_prime: 0.0,
            mean_rt: 0.0,
            median_rt: 0.0,
            rt_std: 0.0,
            rt_var: 0.0,
            acs_score: None,
            response_times: Vec::new(),
        }
    }

    /// Scalar metrics as `(name, value)` pairs, in report order.
    pub fn scalar_metrics(&self) -> Vec<(&'static str, f64)> {
        let c = &self.counters;
        let mut metrics = vec![
            ("total_stimuli", c.stimuli_shown as f64),
            ("target_stimuli", c.target_stimuli as f64),
            ("non_target_stimuli", c.non_target_stimuli as f64),
            ("correct_responses", c.correct_responses as f64),
            ("commission_errors", c.commission_errors as f64),
            ("omission_errors", c.omission_errors as f64),
            ("anticipatory_responses", c.anticipatory_responses as f64),
            ("multiple_responses", c.multiple_responses as f64),
            ("post_commission_errors", c.post_commission_errors as f64),
            ("hit_rate", self.hit_rate),
            ("false_alarm_rate", self.false_alarm_rate),
            ("omission_rate", self.omission_rate),
            ("d_prime", self.d_prime),
            ("mean_rt", self.mean_rt),
            ("median_rt", self.median_rt),
            ("rt_std", self.rt_std),
            ("rt_var", self.rt_var),
        ];
        if let Some(acs) = self.acs_score {
            metrics.push(("acs_score", acs));
        }
        metrics
    }
}

/// Everything a finished (or in-progress) session produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResults {
    /// Unique session identifier.
    pub id: Uuid,
    pub kind: TestKind,
    /// IMT/DMT sessions only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_mode: Option<MemoryMode>,
    pub participant: ParticipantInfo,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
    /// Finalized phases keyed by phase identifier.
    pub phases: BTreeMap<PhaseId, PhaseResult>,
}

impl SessionResults {
    pub fn new(kind: TestKind, participant: ParticipantInfo) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            memory_mode: None,
            participant,
            started_at: Utc::now(),
            ended_at: None,
            phases: BTreeMap::new(),
        }
    }

    pub fn phase(&self, id: PhaseId) -> Option<&PhaseResult> {
        self.phases.get(&id)
    }

    pub fn is_finished(&self) -> bool {
        self.ended_at.is_some()
    }

    /// Store a finalized phase. An existing entry is never overwritten.
    pub(crate) fn record_phase(&mut self, id: PhaseId, result: PhaseResult) {
        self.phases.entry(id).or_insert(result);
    }

    /// Save the results as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize results")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write results to {}", path.display()))?;
        Ok(())
    }

    /// Load results from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read results from {}", path.display()))?;
        let results: SessionResults =
            serde_json::from_str(&content).context("failed to parse results JSON")?;
        Ok(results)
    }
}
