//! Battery configuration: protocol constants per test, loaded from TOML.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::MemoryMode;

/// Timing parameters shared by every test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestTimings {
    pub test_duration: Duration,
    pub stimulus_duration: Duration,
    /// Onset-to-onset interval between stimuli.
    pub inter_stimulus_interval: Duration,
    /// Minimum gap between two accepted responses.
    pub debounce: Duration,
}

impl TestTimings {
    fn from_parts(duration_secs: u64, stimulus_ms: u64, isi_ms: u64, debounce_ms: u64) -> Self {
        Self {
            test_duration: Duration::from_secs(duration_secs),
            stimulus_duration: Duration::from_millis(stimulus_ms),
            inter_stimulus_interval: Duration::from_millis(isi_ms),
            debounce: Duration::from_millis(debounce_ms),
        }
    }

    /// Halfway point, where two-phase tests switch.
    pub fn midpoint(&self) -> Duration {
        self.test_duration / 2
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.test_duration.is_zero() {
            return Err(ConfigError::ZeroDuration("duration_secs"));
        }
        if self.stimulus_duration.is_zero() {
            return Err(ConfigError::ZeroDuration("stimulus_ms"));
        }
        if self.inter_stimulus_interval.is_zero() {
            return Err(ConfigError::ZeroDuration("isi_ms"));
        }
        if self.stimulus_duration > self.inter_stimulus_interval {
            return Err(ConfigError::StimulusExceedsInterval {
                stimulus_ms: self.stimulus_duration.as_millis() as u64,
                interval_ms: self.inter_stimulus_interval.as_millis() as u64,
            });
        }
        Ok(())
    }
}

fn check_probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidProbability { field, value })
    }
}

const DEFAULT_DEBOUNCE_MS: u64 = 200;

/// Continuous Performance Task settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CptConfig {
    pub duration_secs: u64,
    pub stimulus_ms: u64,
    pub isi_ms: u64,
    pub debounce_ms: u64,
    /// Probability that a stimulus is the target letter.
    pub target_ratio: f64,
    pub target_symbol: char,
}

impl Default for CptConfig {
    fn default() -> Self {
        Self {
            duration_secs: 300,
            stimulus_ms: 250,
            isi_ms: 1500,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            target_ratio: 0.2,
            target_symbol: 'X',
        }
    }
}

impl CptConfig {
    pub fn timings(&self) -> TestTimings {
        TestTimings::from_parts(self.duration_secs, self.stimulus_ms, self.isi_ms, self.debounce_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.timings().validate()?;
        check_probability("cpt.target_ratio", self.target_ratio)?;
        if !self.target_symbol.is_ascii_uppercase() {
            return Err(ConfigError::InvalidSymbol(self.target_symbol));
        }
        Ok(())
    }
}

/// Immediate / Delayed Memory Task settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    pub duration_secs: u64,
    pub stimulus_ms: u64,
    pub isi_ms: u64,
    pub debounce_ms: u64,
    /// How many stimuli back a DMT target repeats.
    pub delay: usize,
    /// Digits per stimulus.
    pub stimulus_length: usize,
    /// Probability of drawing a target once history allows one.
    pub target_probability: f64,
    pub mode: MemoryMode,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            duration_secs: 600,
            stimulus_ms: 500,
            isi_ms: 1500,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            delay: 3,
            stimulus_length: 5,
            target_probability: 0.25,
            mode: MemoryMode::Both,
        }
    }
}

impl MemoryConfig {
    pub fn timings(&self) -> TestTimings {
        TestTimings::from_parts(self.duration_secs, self.stimulus_ms, self.isi_ms, self.debounce_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.timings().validate()?;
        check_probability("memory.target_probability", self.target_probability)?;
        if self.delay == 0 {
            return Err(ConfigError::InvalidDelay(self.delay));
        }
        if !(1..=16).contains(&self.stimulus_length) {
            return Err(ConfigError::InvalidStimulusLength(self.stimulus_length));
        }
        Ok(())
    }
}

/// Test of Variables of Attention settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TovaConfig {
    pub duration_secs: u64,
    pub stimulus_ms: u64,
    pub isi_ms: u64,
    pub debounce_ms: u64,
    /// Target probability during the first half.
    pub infrequent_ratio: f64,
    /// Target probability during the second half.
    pub frequent_ratio: f64,
    /// Responses faster than this are anticipatory guesses.
    pub anticipatory_ms: u64,
}

impl Default for TovaConfig {
    fn default() -> Self {
        Self {
            duration_secs: 1200,
            stimulus_ms: 100,
            isi_ms: 2000,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            infrequent_ratio: 0.225,
            frequent_ratio: 0.775,
            anticipatory_ms: 150,
        }
    }
}

impl TovaConfig {
    pub fn timings(&self) -> TestTimings {
        TestTimings::from_parts(self.duration_secs, self.stimulus_ms, self.isi_ms, self.debounce_ms)
    }

    pub fn anticipatory_threshold(&self) -> Duration {
        Duration::from_millis(self.anticipatory_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.timings().validate()?;
        check_probability("tova.infrequent_ratio", self.infrequent_ratio)?;
        check_probability("tova.frequent_ratio", self.frequent_ratio)?;
        Ok(())
    }
}

/// Top-level attentest configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatteryConfig {
    /// Where reports are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub cpt: CptConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub tova: TovaConfig,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./attentest-results")
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            cpt: CptConfig::default(),
            memory: MemoryConfig::default(),
            tova: TovaConfig::default(),
        }
    }
}

impl BatteryConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.cpt.validate()?;
        self.memory.validate()?;
        self.tova.validate()?;
        Ok(())
    }

    /// Render the configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to serialize config")
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `attentest.toml` in the current directory
/// 2. `~/.config/attentest/config.toml`
///
/// Environment variable override: `ATTENTEST_OUTPUT_DIR`.
pub fn load_config() -> Result<BatteryConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<BatteryConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("attentest.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<BatteryConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => BatteryConfig::default(),
    };

    if let Ok(dir) = std::env::var("ATTENTEST_OUTPUT_DIR") {
        if !dir.is_empty() {
            config.output_dir = PathBuf::from(dir);
        }
    }

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("attentest"))
}
