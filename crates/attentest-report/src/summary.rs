//! Cross-phase TOVA assessment.

use std::fmt;

use attentest_core::model::PhaseId;
use attentest_core::results::SessionResults;

/// Indicator band derived from the overall ACS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorLikelihood {
    High,
    Moderate,
    Low,
}

impl IndicatorLikelihood {
    /// Below 40 is high, below 60 moderate, anything else low.
    pub fn from_acs(acs: f64) -> Self {
        if acs < 40.0 {
            IndicatorLikelihood::High
        } else if acs < 60.0 {
            IndicatorLikelihood::Moderate
        } else {
            IndicatorLikelihood::Low
        }
    }

    /// Display color for the HTML report.
    pub fn color(&self) -> &'static str {
        match self {
            IndicatorLikelihood::High => "#F44336",
            IndicatorLikelihood::Moderate => "#FF9800",
            IndicatorLikelihood::Low => "#4CAF50",
        }
    }
}

impl fmt::Display for IndicatorLikelihood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorLikelihood::High => write!(f, "High"),
            IndicatorLikelihood::Moderate => write!(f, "Moderate"),
            IndicatorLikelihood::Low => write!(f, "Low"),
        }
    }
}

/// Summary across both TOVA phases.
#[derive(Debug, Clone, PartialEq)]
pub struct OverallAssessment {
    /// Mean of the two phase ACS values.
    pub overall_acs: f64,
    pub likelihood: IndicatorLikelihood,
    /// Infrequent minus frequent mean RT; positive means faster in the
    /// frequent phase. `None` unless both phases have correct responses.
    pub rt_improvement_ms: Option<f64>,
    pub rt_improvement_percent: Option<f64>,
}

impl OverallAssessment {
    /// Requires both TOVA phases; returns `None` otherwise.
    pub fn from_results(results: &SessionResults) -> Option<Self> {
        let infrequent = results.phase(PhaseId::InfrequentTargets)?;
        let frequent = results.phase(PhaseId::FrequentTargets)?;

        let overall_acs =
            (infrequent.acs_score.unwrap_or(0.0) + frequent.acs_score.unwrap_or(0.0)) / 2.0;

        let (rt_improvement_ms, rt_improvement_percent) =
            if infrequent.mean_rt > 0.0 && frequent.mean_rt > 0.0 {
                let delta = infrequent.mean_rt - frequent.mean_rt;
                (Some(delta), Some(delta / infrequent.mean_rt * 100.0))
            } else {
                (None, None)
            };

        Some(Self {
            overall_acs,
            likelihood: IndicatorLikelihood::from_acs(overall_acs),
            rt_improvement_ms,
            rt_improvement_percent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{phase_result, session};
    use attentest_core::model::TestKind;

    #[test]
    fn likelihood_bands() {
        assert_eq!(IndicatorLikelihood::from_acs(12.0), IndicatorLikelihood::High);
        assert_eq!(IndicatorLikelihood::from_acs(40.0), IndicatorLikelihood::Moderate);
        assert_eq!(IndicatorLikelihood::from_acs(59.9), IndicatorLikelihood::Moderate);
        assert_eq!(IndicatorLikelihood::from_acs(60.0), IndicatorLikelihood::Low);
    }

    #[test]
    fn overall_averages_phases() {
        let mut infrequent = phase_result(420.0);
        infrequent.acs_score = Some(50.0);
        let mut frequent = phase_result(378.0);
        frequent.acs_score = Some(70.0);

        let results = session(
            TestKind::Tova,
            vec![
                (PhaseId::InfrequentTargets, infrequent),
                (PhaseId::FrequentTargets, frequent),
            ],
        );
        let overall = OverallAssessment::from_results(&results).unwrap();
        assert!((overall.overall_acs - 60.0).abs() < 1e-9);
        assert_eq!(overall.likelihood, IndicatorLikelihood::Low);
        assert!((overall.rt_improvement_ms.unwrap() - 42.0).abs() < 1e-9);
        assert!((overall.rt_improvement_percent.unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn single_phase_has_no_assessment() {
        let results = session(
            TestKind::Tova,
            vec![(PhaseId::InfrequentTargets, phase_result(400.0))],
        );
        assert!(OverallAssessment::from_results(&results).is_none());
    }

    #[test]
    fn missing_rt_skips_improvement() {
        let results = session(
            TestKind::Tova,
            vec![
                (PhaseId::InfrequentTargets, phase_result(0.0)),
                (PhaseId::FrequentTargets, phase_result(380.0)),
            ],
        );
        let overall = OverallAssessment::from_results(&results).unwrap();
        assert!(overall.rt_improvement_ms.is_none());
    }
}
