//! Signal-detection and response-time statistics.
//!
//! d-prime uses the 1/(2N) edge correction for perfect and zero rates and
//! falls back to a bounded constant when the probit cannot be evaluated.

use statrs::distribution::{ContinuousCDF, Normal};

use crate::error::StatsError;

/// d-prime reported when the probit fails and hits outnumber false alarms.
pub const DPRIME_CEILING: f64 = 4.65;

/// Rate substituted for a perfect rate when its trial count is zero.
const EMPTY_HIGH_RATE: f64 = 0.99;
/// Rate substituted for a zero rate when its trial count is zero.
const EMPTY_LOW_RATE: f64 = 0.01;

/// Standard normal inverse CDF (probit), defined on the open interval (0, 1).
pub fn probit(p: f64) -> Result<f64, StatsError> {
    // Written so NaN also fails the check.
    if !(p > 0.0 && p < 1.0) {
        return Err(StatsError::OutOfDomain(p));
    }
    Ok(Normal::standard().inverse_cdf(p))
}

/// Replace a rate of exactly 0 or 1 with `1/(2N)` or `1 - 1/(2N)`.
///
/// With `n == 0` the fixed rates 0.01 and 0.99 are used instead.
pub fn corrected_rate(rate: f64, n: u32) -> f64 {
    if rate == 1.0 {
        if n > 0 {
            1.0 - 1.0 / (2.0 * n as f64)
        } else {
            EMPTY_HIGH_RATE
        }
    } else if rate == 0.0 {
        if n > 0 {
            1.0 / (2.0 * n as f64)
        } else {
            EMPTY_LOW_RATE
        }
    } else {
        rate
    }
}

/// Sensitivity index `probit(hit_rate) - probit(false_alarm_rate)`.
///
/// Rates are edge-corrected against their trial counts first. If either
/// probit still fails, returns [`DPRIME_CEILING`] when the corrected hit rate
/// exceeds the corrected false-alarm rate and `0.0` otherwise.
pub fn d_prime(hit_rate: f64, false_alarm_rate: f64, targets: u32, non_targets: u32) -> f64 {
    let hit = corrected_rate(hit_rate, targets);
    let false_alarm = corrected_rate(false_alarm_rate, non_targets);

    match (probit(hit), probit(false_alarm)) {
        (Ok(z_hit), Ok(z_fa)) => z_hit - z_fa,
        (Err(e), _) | (_, Err(e)) => {
            let fallback = if hit > false_alarm { DPRIME_CEILING } else { 0.0 };
            tracing::warn!(
                hit_rate = hit,
                false_alarm_rate = false_alarm,
                "d-prime fallback to {fallback}: {e}"
            );
            fallback
        }
    }
}

/// Arithmetic mean, zero for an empty slice.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        0.0
    } else {
        data.iter().sum::<f64>() / data.len() as f64
    }
}

/// Population variance, zero for fewer than two samples.
pub fn variance(data: &[f64]) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }
    let m = mean(data);
    data.iter().map(|x| (x - m).powi(2)).sum::<f64>() / data.len() as f64
}

/// Population standard deviation, zero for fewer than two samples.
pub fn std_dev(data: &[f64]) -> f64 {
    variance(data).sqrt()
}

/// Linear-interpolated median, zero for an empty slice.
pub fn median(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = 0.5 * (sorted.len() as f64 - 1.0);
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (rank - lower as f64)
}

/// The four normalized inputs of the Attention Comparison Score.
///
/// Each component lies in `[-1, 1]`; higher is better.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcsComponents {
    pub response_time: f64,
    pub accuracy: f64,
    pub variability: f64,
    pub impulsivity: f64,
}

impl AcsComponents {
    /// Ideal mean response time in milliseconds.
    const IDEAL_RT_MS: f64 = 400.0;
    /// Response-time deviation mapped to a full component swing.
    const RT_SPAN_MS: f64 = 200.0;
    /// Variance (200ms squared) mapped to a zero variability component.
    const VARIANCE_SPAN: f64 = 40_000.0;
    /// d-prime mapped to a full accuracy component.
    const DPRIME_SPAN: f64 = 4.0;

    /// Derive the components. Missing inputs (no hits, no variance, no
    /// non-targets) contribute a neutral zero.
    pub fn compute(mean_rt: f64, d_prime: f64, rt_var: f64, false_alarm_rate: f64, non_targets: u32) -> Self {
        let response_time = if mean_rt > 0.0 {
            ((Self::IDEAL_RT_MS - mean_rt) / Self::RT_SPAN_MS).clamp(-1.0, 1.0)
        } else {
            0.0
        };
        let accuracy = (d_prime / Self::DPRIME_SPAN).clamp(-1.0, 1.0);
        let variability = if rt_var > 0.0 {
            (1.0 - rt_var / Self::VARIANCE_SPAN).clamp(-1.0, 1.0)
        } else {
            0.0
        };
        let impulsivity = if non_targets > 0 {
            (1.0 - 2.0 * false_alarm_rate).clamp(-1.0, 1.0)
        } else {
            0.0
        };

        Self {
            response_time,
            accuracy,
            variability,
            impulsivity,
        }
    }

    /// Composite score rescaled from `[-4, 4]` to `[0, 100]`.
    pub fn score(&self) -> f64 {
        let sum = self.response_time + self.accuracy + self.variability + self.impulsivity;
        (sum + 4.0) / 8.0 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const Z_95: f64 = 1.644_853_626_951_472_2;

    #[test]
    fn probit_known_values() {
        assert!(probit(0.5).unwrap().abs() < 1e-9);
        assert!((probit(0.95).unwrap() - Z_95).abs() < 1e-6);
        assert!((probit(0.05).unwrap() + Z_95).abs() < 1e-6);
        assert!((probit(0.001).unwrap() + 3.090_232_306_167_813).abs() < 1e-6);
    }

    #[test]
    fn probit_is_symmetric_in_the_tails() {
        let upper = probit(0.975).unwrap();
        assert!((upper - 1.959_963_984_540_054).abs() < 1e-9, "got {upper}");
        for p in [1e-6, 0.01, 0.2, 0.4] {
            let sum = probit(p).unwrap() + probit(1.0 - p).unwrap();
            assert!(sum.abs() < 1e-9, "probit({p}) not symmetric: {sum}");
        }
    }

    #[test]
    fn probit_rejects_out_of_domain() {
        assert_eq!(probit(0.0), Err(StatsError::OutOfDomain(0.0)));
        assert!(probit(1.0).is_err());
        assert!(probit(-0.2).is_err());
        assert!(probit(f64::NAN).is_err());
    }

    #[test]
    fn perfect_hit_rate_uses_half_trial_correction() {
        // hit rate 1.0 over 10 targets becomes 0.95
        let d = d_prime(1.0, 0.5, 10, 10);
        assert!(d.is_finite());
        assert!((d - Z_95).abs() < 1e-6, "expected {Z_95}, got {d}");
    }

    #[test]
    fn zero_false_alarm_rate_uses_half_trial_correction() {
        let d = d_prime(0.5, 0.0, 10, 10);
        assert!((d - Z_95).abs() < 1e-6, "got {d}");
    }

    #[test]
    fn empty_trial_counts_use_fixed_rates() {
        assert_eq!(corrected_rate(1.0, 0), 0.99);
        assert_eq!(corrected_rate(0.0, 0), 0.01);
        assert_eq!(corrected_rate(0.3, 0), 0.3);

        let d = d_prime(0.0, 0.0, 0, 0);
        assert!(d.abs() < 1e-12, "equal corrected rates give zero, got {d}");
    }

    #[test]
    fn d_prime_monotonic_in_hit_rate() {
        let fa = 0.3;
        let mut last = f64::NEG_INFINITY;
        for step in 1..100 {
            let hit = step as f64 / 100.0;
            let d = d_prime(hit, fa, 40, 160);
            assert!(d >= last, "d' decreased at hit rate {hit}");
            last = d;
        }
    }

    #[test]
    fn d_prime_antitonic_in_false_alarm_rate() {
        let hit = 0.7;
        let mut last = f64::INFINITY;
        for step in 1..100 {
            let fa = step as f64 / 100.0;
            let d = d_prime(hit, fa, 40, 160);
            assert!(d <= last, "d' increased at false-alarm rate {fa}");
            last = d;
        }
    }

    #[test]
    fn out_of_domain_rates_fall_back() {
        assert_eq!(d_prime(1.5, 0.2, 10, 10), DPRIME_CEILING);
        assert_eq!(d_prime(0.1, 1.5, 10, 10), 0.0);
        assert_eq!(d_prime(f64::NAN, 0.2, 10, 10), 0.0);
    }

    #[test]
    fn dispersion_uses_population_formulas() {
        let data = [300.0, 400.0, 500.0];
        assert!((mean(&data) - 400.0).abs() < f64::EPSILON);
        assert!((variance(&data) - 20_000.0 / 3.0).abs() < 1e-9);
        assert!((std_dev(&data) - (20_000.0f64 / 3.0).sqrt()).abs() < 1e-9);
        assert_eq!(variance(&[350.0]), 0.0);
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn median_interpolates() {
        assert_eq!(median(&[]), 0.0);
        assert_eq!(median(&[480.0]), 480.0);
        assert_eq!(median(&[500.0, 300.0, 400.0]), 400.0);
        assert_eq!(median(&[300.0, 400.0, 500.0, 600.0]), 450.0);
    }

    #[test]
    fn acs_neutral_inputs_score_fifty() {
        let acs = AcsComponents::compute(0.0, 0.0, 0.0, 0.0, 0);
        assert!((acs.score() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn acs_components_are_clamped() {
        let acs = AcsComponents::compute(50.0, 9.0, 1_000_000.0, 1.0, 10);
        assert_eq!(acs.response_time, 1.0);
        assert_eq!(acs.accuracy, 1.0);
        assert_eq!(acs.variability, -1.0);
        assert_eq!(acs.impulsivity, -1.0);
        let score = acs.score();
        assert!((0.0..=100.0).contains(&score));
        assert!((score - 50.0).abs() < f64::EPSILON);
    }
}
