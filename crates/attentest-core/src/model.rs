//! Core data model types shared by the three test engines.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SessionError;

/// Participant details attached by the caller before `start`.
///
/// The engines never interpret these fields; they are copied verbatim into
/// the session results for the report writers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantInfo {
    pub name: String,
    pub age: u32,
    pub gender: String,
    /// Session date as entered by the operator (free-form).
    pub date: String,
}

impl ParticipantInfo {
    pub fn new(
        name: impl Into<String>,
        age: u32,
        gender: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            age,
            gender: gender.into(),
            date: date.into(),
        }
    }

    /// Check the fields an operator must fill in.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.name.trim().is_empty() {
            return Err(SessionError::InvalidParticipant("name is empty".into()));
        }
        if self.gender.trim().is_empty() {
            return Err(SessionError::InvalidParticipant("gender is empty".into()));
        }
        if self.age == 0 || self.age > 130 {
            return Err(SessionError::InvalidParticipant(format!(
                "age {} is not plausible",
                self.age
            )));
        }
        Ok(())
    }
}

/// Which test protocol produced a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestKind {
    Cpt,
    ImtDmt,
    Tova,
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestKind::Cpt => write!(f, "CPT"),
            TestKind::ImtDmt => write!(f, "IMT/DMT"),
            TestKind::Tova => write!(f, "TOVA"),
        }
    }
}

impl FromStr for TestKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cpt" => Ok(TestKind::Cpt),
            "imt-dmt" | "imt_dmt" | "imtdmt" | "imt/dmt" => Ok(TestKind::ImtDmt),
            "tova" => Ok(TestKind::Tova),
            other => Err(format!("unknown test: {other}")),
        }
    }
}

/// Key of a finalized phase in the results mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PhaseId {
    #[serde(rename = "cpt")]
    Cpt,
    #[serde(rename = "IMT")]
    Imt,
    #[serde(rename = "DMT")]
    Dmt,
    #[serde(rename = "infrequent_targets")]
    InfrequentTargets,
    #[serde(rename = "frequent_targets")]
    FrequentTargets,
}

impl PhaseId {
    /// Stable key used in the results mapping and file names.
    pub fn key(&self) -> &'static str {
        match self {
            PhaseId::Cpt => "cpt",
            PhaseId::Imt => "IMT",
            PhaseId::Dmt => "DMT",
            PhaseId::InfrequentTargets => "infrequent_targets",
            PhaseId::FrequentTargets => "frequent_targets",
        }
    }

    /// Human-readable phase title.
    pub fn title(&self) -> &'static str {
        match self {
            PhaseId::Cpt => "Continuous Performance Task",
            PhaseId::Imt => "Immediate Memory Task",
            PhaseId::Dmt => "Delayed Memory Task",
            PhaseId::InfrequentTargets => "Infrequent Targets (First Half)",
            PhaseId::FrequentTargets => "Frequent Targets (Second Half)",
        }
    }
}

impl fmt::Display for PhaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// IMT/DMT session mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryMode {
    Imt,
    Dmt,
    /// IMT for the first half of the session, DMT for the second.
    #[default]
    Both,
}

impl fmt::Display for MemoryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryMode::Imt => write!(f, "IMT"),
            MemoryMode::Dmt => write!(f, "DMT"),
            MemoryMode::Both => write!(f, "BOTH"),
        }
    }
}

impl FromStr for MemoryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "imt" => Ok(MemoryMode::Imt),
            "dmt" => Ok(MemoryMode::Dmt),
            "both" => Ok(MemoryMode::Both),
            other => Err(format!("unknown memory mode: {other}")),
        }
    }
}

/// The binary TOVA stimulus category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TovaStimulus {
    Target,
    NonTarget,
}

impl fmt::Display for TovaStimulus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TovaStimulus::Target => write!(f, "target"),
            TovaStimulus::NonTarget => write!(f, "non-target"),
        }
    }
}

/// Lifecycle of a single engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Constructed but not started; operations are ignored.
    #[default]
    Idle,
    Running,
    /// Results are frozen; operations are ignored until the next `start`.
    Ended,
}

/// Format remaining seconds as `m:ss`.
pub fn format_remaining(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display_and_parse() {
        assert_eq!(TestKind::ImtDmt.to_string(), "IMT/DMT");
        assert_eq!("TOVA".parse::<TestKind>().unwrap(), TestKind::Tova);
        assert_eq!("imt_dmt".parse::<TestKind>().unwrap(), TestKind::ImtDmt);
        assert!("stroop".parse::<TestKind>().is_err());
    }

    #[test]
    fn memory_mode_parse_is_case_insensitive() {
        assert_eq!("BOTH".parse::<MemoryMode>().unwrap(), MemoryMode::Both);
        assert_eq!("dmt".parse::<MemoryMode>().unwrap(), MemoryMode::Dmt);
        assert!("nback".parse::<MemoryMode>().is_err());
    }

    #[test]
    fn phase_ids_serialize_as_result_keys() {
        let json = serde_json::to_string(&PhaseId::InfrequentTargets).unwrap();
        assert_eq!(json, "\"infrequent_targets\"");
        assert_eq!(PhaseId::Imt.key(), "IMT");
    }

    #[test]
    fn participant_validation() {
        let ok = ParticipantInfo::new("Ada", 34, "female", "2026-10-16");
        assert!(ok.validate().is_ok());

        let nameless = ParticipantInfo::new("  ", 34, "female", "2026-10-16");
        assert!(matches!(
            nameless.validate(),
            Err(SessionError::InvalidParticipant(_))
        ));

        let newborn = ParticipantInfo::new("Ada", 0, "female", "2026-10-16");
        assert!(newborn.validate().is_err());
    }

    #[test]
    fn remaining_time_formatting() {
        assert_eq!(format_remaining(300.0), "5:00");
        assert_eq!(format_remaining(61.9), "1:01");
        assert_eq!(format_remaining(-3.0), "0:00");
    }
}
