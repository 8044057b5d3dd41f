//! Error types for sessions, configuration and statistics.
//!
//! Degenerate sessions are not errors: they resolve to zero-valued metrics.
//! These types only cover lifecycle misuse, invalid configuration, and the
//! probit domain check that feeds the d-prime fallback.

use thiserror::Error;

/// Errors raised by session lifecycle operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The session was never started.
    #[error("session has not been started")]
    NotStarted,

    /// The session already ended; its results are frozen.
    #[error("session already ended")]
    AlreadyEnded,

    /// Participant details failed validation.
    #[error("invalid participant info: {0}")]
    InvalidParticipant(String),
}

/// Errors raised when validating test configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A probability or ratio was outside `[0, 1]`.
    #[error("{field} must be between 0.0 and 1.0, got {value}")]
    InvalidProbability { field: &'static str, value: f64 },

    /// A duration that must be positive was zero.
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    /// The stimulus duration does not fit inside the stimulus interval.
    #[error("stimulus duration ({stimulus_ms}ms) exceeds inter-stimulus interval ({interval_ms}ms)")]
    StimulusExceedsInterval { stimulus_ms: u64, interval_ms: u64 },

    /// The DMT delay must look back at least one stimulus.
    #[error("DMT delay must be at least 1, got {0}")]
    InvalidDelay(usize),

    /// Digit strings need at least one digit.
    #[error("stimulus length must be between 1 and 16, got {0}")]
    InvalidStimulusLength(usize),

    /// The CPT target must be an uppercase ASCII letter.
    #[error("target symbol must be an uppercase ASCII letter, got {0:?}")]
    InvalidSymbol(char),
}

/// Numerical domain failures inside the statistics helpers.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum StatsError {
    /// Probit is only defined on the open interval (0, 1).
    #[error("probit argument {0} outside (0, 1)")]
    OutOfDomain(f64),
}
