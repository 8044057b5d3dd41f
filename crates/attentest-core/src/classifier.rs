//! Response classification.
//!
//! Classification is pure: each function looks at the current stimulus (or
//! the stimulus history) and returns a [`ResponseOutcome`]. The engine then
//! applies the outcome to its [`PhaseState`].

use std::time::Duration;

use crate::counters::PhaseState;
use crate::model::TovaStimulus;

/// Why a response was dropped without touching any counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The engine is idle or has ended.
    NotRunning,
    /// Arrived inside the debounce window of the last accepted response.
    Debounced,
    /// No stimulus has been presented yet.
    NoStimulus,
}

/// The classification of one response event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResponseOutcome {
    /// Correct response to a target.
    Hit { latency_ms: f64 },
    /// Response to a non-target.
    Commission { post_commission: bool },
    /// Another press on a stimulus that already has a response.
    Repeat,
    /// Faster than the anticipatory threshold; treated as a guess.
    Anticipatory { latency_ms: f64 },
    Ignored(IgnoreReason),
}

impl ResponseOutcome {
    /// Whether the response was accepted (and so resets the debounce timer).
    pub fn is_accepted(&self) -> bool {
        !matches!(self, ResponseOutcome::Ignored(_))
    }

    /// Apply this outcome to the active phase.
    pub fn apply(&self, phase: &mut PhaseState) {
        let counters = &mut phase.counters;
        match *self {
            ResponseOutcome::Hit { latency_ms } => {
                counters.correct_responses += 1;
                phase.response_times.push(latency_ms);
            }
            ResponseOutcome::Commission { post_commission } => {
                counters.commission_errors += 1;
                if post_commission {
                    counters.post_commission_errors += 1;
                }
            }
            ResponseOutcome::Repeat => counters.multiple_responses += 1,
            ResponseOutcome::Anticipatory { .. } => counters.anticipatory_responses += 1,
            ResponseOutcome::Ignored(_) => {}
        }
    }
}

/// Classify a CPT or IMT/DMT response.
///
/// Each target is credited at most once; later presses on it are repeats.
/// Every press on a non-target is a commission error.
pub fn classify_match(is_target: bool, already_credited: bool, latency: Duration) -> ResponseOutcome {
    match (is_target, already_credited) {
        (true, false) => ResponseOutcome::Hit {
            latency_ms: as_millis_f64(latency),
        },
        (true, true) => ResponseOutcome::Repeat,
        (false, _) => ResponseOutcome::Commission {
            post_commission: false,
        },
    }
}

/// Whether the newest history entry repeats the entry `lookback` positions
/// before it.
///
/// IMT uses a look-back of 1, DMT its configured delay.
pub fn memory_target<T: PartialEq>(history: &[T], lookback: usize) -> bool {
    if lookback == 0 || history.len() <= lookback {
        return false;
    }
    let last = history.len() - 1;
    history[last] == history[last - lookback]
}

/// Inputs to a TOVA classification.
#[derive(Debug, Clone, Copy)]
pub struct TovaResponse {
    pub stimulus: TovaStimulus,
    /// Responses to the current stimulus, including this one.
    pub response_count: u32,
    pub latency: Duration,
    pub anticipatory_threshold: Duration,
    /// Whether the previous classified response was a commission error.
    pub follows_commission: bool,
}

/// Classify a TOVA response: repeats first, then anticipatory guesses, then
/// target versus non-target.
pub fn classify_tova(r: &TovaResponse) -> ResponseOutcome {
    if r.response_count > 1 {
        return ResponseOutcome::Repeat;
    }
    if r.latency < r.anticipatory_threshold {
        return ResponseOutcome::Anticipatory {
            latency_ms: as_millis_f64(r.latency),
        };
    }
    match r.stimulus {
        TovaStimulus::Target => ResponseOutcome::Hit {
            latency_ms: as_millis_f64(r.latency),
        },
        TovaStimulus::NonTarget => ResponseOutcome::Commission {
            post_commission: r.follows_commission,
        },
    }
}

pub(crate) fn as_millis_f64(d: Duration) -> f64 {
    d.as_nanos() as f64 / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn imt_matches_immediately_preceding() {
        assert!(memory_target(&["12345", "67890", "67890"], 1));
        assert!(!memory_target(&["12345", "67890", "11111"], 1));
        assert!(!memory_target(&["12345"], 1));
    }

    #[test]
    fn dmt_looks_back_by_delay() {
        assert!(memory_target(&["A", "B", "C", "A"], 3));
        assert!(!memory_target(&["A", "B", "C", "D"], 3));
        // C repeats one back, which is not a DMT match
        assert!(!memory_target(&["A", "B", "C", "C"], 3));
        assert!(!memory_target(&["B", "C", "A"], 3));
    }

    #[test]
    fn zero_lookback_never_matches() {
        assert!(!memory_target(&["A", "A"], 0));
    }

    #[test]
    fn classify_match_credits_once() {
        assert_eq!(
            classify_match(true, false, ms(420)),
            ResponseOutcome::Hit { latency_ms: 420.0 }
        );
        assert_eq!(classify_match(true, true, ms(700)), ResponseOutcome::Repeat);
        assert_eq!(
            classify_match(false, true, ms(300)),
            ResponseOutcome::Commission {
                post_commission: false
            }
        );
    }

    fn tova(stimulus: TovaStimulus, count: u32, latency: u64, follows: bool) -> TovaResponse {
        TovaResponse {
            stimulus,
            response_count: count,
            latency: ms(latency),
            anticipatory_threshold: ms(150),
            follows_commission: follows,
        }
    }

    #[test]
    fn tova_repeat_takes_precedence() {
        let r = tova(TovaStimulus::Target, 2, 90, false);
        assert_eq!(classify_tova(&r), ResponseOutcome::Repeat);
    }

    #[test]
    fn tova_anticipatory_below_threshold() {
        let r = tova(TovaStimulus::Target, 1, 149, false);
        assert_eq!(
            classify_tova(&r),
            ResponseOutcome::Anticipatory { latency_ms: 149.0 }
        );
        let r = tova(TovaStimulus::Target, 1, 150, false);
        assert!(matches!(classify_tova(&r), ResponseOutcome::Hit { .. }));
    }

    #[test]
    fn tova_post_commission_flag() {
        let r = tova(TovaStimulus::NonTarget, 1, 400, true);
        assert_eq!(
            classify_tova(&r),
            ResponseOutcome::Commission {
                post_commission: true
            }
        );
    }

    #[test]
    fn apply_updates_counters() {
        let mut phase = PhaseState::default();
        ResponseOutcome::Hit { latency_ms: 350.0 }.apply(&mut phase);
        ResponseOutcome::Commission {
            post_commission: true,
        }
        .apply(&mut phase);
        ResponseOutcome::Repeat.apply(&mut phase);
        ResponseOutcome::Anticipatory { latency_ms: 80.0 }.apply(&mut phase);
        ResponseOutcome::Ignored(IgnoreReason::Debounced).apply(&mut phase);

        let c = &phase.counters;
        assert_eq!(c.correct_responses, 1);
        assert_eq!(c.commission_errors, 1);
        assert_eq!(c.post_commission_errors, 1);
        assert_eq!(c.multiple_responses, 1);
        assert_eq!(c.anticipatory_responses, 1);
        assert_eq!(phase.response_times.as_slice(), &[350.0]);
    }
}
