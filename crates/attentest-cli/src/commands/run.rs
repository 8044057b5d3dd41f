//! The `attentest run` command.

use std::cell::RefCell;
use std::fmt;
use std::path::PathBuf;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;

use attentest_core::classifier::ResponseOutcome;
use attentest_core::clock::ManualClock;
use attentest_core::config::{load_config_from, BatteryConfig};
use attentest_core::engine::{CptEngine, MemoryEngine, TovaEngine};
use attentest_core::model::{format_remaining, MemoryMode, ParticipantInfo, TestKind};
use attentest_core::results::SessionResults;
use attentest_core::simulation::{run_simulated_session, ResponderProfile, SessionObserver};
use attentest_core::traits::AttentionTest;
use attentest_report::{write_reports, ReportFormat};

use super::show::{overall_line, summary_table};

pub struct RunArgs {
    pub test: TestKind,
    pub mode: Option<MemoryMode>,
    pub seed: Option<u64>,
    pub profile: ResponderProfile,
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub date: Option<String>,
    pub duration: Option<u64>,
    pub output: Option<PathBuf>,
    pub format: String,
    pub config: Option<PathBuf>,
}

/// Console progress observer.
#[derive(Default)]
struct ConsoleObserver {
    phase: RefCell<String>,
}

impl SessionObserver for ConsoleObserver {
    fn on_stimulus(&self, _index: u32, phase_label: &str, _stimulus: &dyn fmt::Display) {
        let mut phase = self.phase.borrow_mut();
        if *phase != phase_label {
            eprintln!("  Phase: {phase_label}");
            *phase = phase_label.to_string();
        }
    }

    fn on_response(&self, outcome: &ResponseOutcome) {
        tracing::trace!(?outcome, "response");
    }

    fn on_tick(&self, remaining_secs: f64) {
        let whole = remaining_secs.round() as u64;
        if whole > 0 && whole % 60 == 0 {
            eprintln!("  {} remaining", format_remaining(remaining_secs));
        }
    }
}

pub fn execute(args: RunArgs) -> Result<()> {
    let mut config = load_config_from(args.config.as_deref())?;
    apply_overrides(&mut config, &args);
    config.validate()?;

    let participant = ParticipantInfo::new(
        args.name.trim(),
        args.age,
        args.gender.trim(),
        args.date
            .clone()
            .unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d").to_string()),
    );
    participant.validate()?;

    let formats = ReportFormat::parse_list(&args.format).map_err(anyhow::Error::msg)?;
    let output = args.output.clone().unwrap_or_else(|| config.output_dir.clone());
    let seed = args.seed.unwrap_or_else(rand::random);

    eprintln!(
        "attentest v{}: {} session, seed {seed}",
        env!("CARGO_PKG_VERSION"),
        args.test
    );

    let clock = ManualClock::new();
    let results = match args.test {
        TestKind::Cpt => {
            let mut engine = CptEngine::seeded(config.cpt.clone(), clock.clone(), seed)?;
            simulate(&mut engine, participant, &clock, &args.profile, seed)?
        }
        TestKind::ImtDmt => {
            let mut engine = MemoryEngine::seeded(config.memory.clone(), clock.clone(), seed)?;
            simulate(&mut engine, participant, &clock, &args.profile, seed)?
        }
        TestKind::Tova => {
            let mut engine = TovaEngine::seeded(config.tova.clone(), clock.clone(), seed)?;
            simulate(&mut engine, participant, &clock, &args.profile, seed)?
        }
    };

    eprintln!("\n{}", summary_table(&results));
    if let Some(line) = overall_line(&results) {
        eprintln!("{line}");
    }

    let files = write_reports(&results, &output, &formats)?;
    for path in files.all() {
        eprintln!("Wrote {}", path.display());
    }

    Ok(())
}

fn apply_overrides(config: &mut BatteryConfig, args: &RunArgs) {
    if let Some(mode) = args.mode {
        config.memory.mode = mode;
    }
    if let Some(secs) = args.duration {
        match args.test {
            TestKind::Cpt => config.cpt.duration_secs = secs,
            TestKind::ImtDmt => config.memory.duration_secs = secs,
            TestKind::Tova => config.tova.duration_secs = secs,
        }
    }
}

fn simulate<T: AttentionTest>(
    engine: &mut T,
    participant: ParticipantInfo,
    clock: &ManualClock,
    profile: &ResponderProfile,
    seed: u64,
) -> Result<SessionResults> {
    engine.set_participant(participant);
    // separate stream from the engine's
    let mut rng = StdRng::seed_from_u64(seed ^ 0x9E37_79B9_7F4A_7C15);
    let observer = ConsoleObserver::default();
    let results = run_simulated_session(engine, clock, profile, &mut rng, &observer)?;
    Ok(results)
}
