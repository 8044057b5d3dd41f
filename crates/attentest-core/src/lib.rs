//! attentest-core: Trial state machines and scoring for attention tests.
//!
//! This crate holds the Continuous Performance Task, the Immediate/Delayed
//! Memory Task and the Test of Variables of Attention engines, together with
//! the signal-detection statistics and the results model every report
//! builds on.

pub mod classifier;
pub mod clock;
pub mod config;
pub mod counters;
pub mod engine;
pub mod error;
pub mod model;
pub mod results;
pub mod session;
pub mod simulation;
pub mod statistics;
pub mod traits;
