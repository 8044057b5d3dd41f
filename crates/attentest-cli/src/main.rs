//! attentest CLI: simulated attention-test sessions and their reports.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use attentest_core::model::{MemoryMode, TestKind};
use attentest_core::simulation::ResponderProfile;

mod commands;

#[derive(Parser)]
#[command(name = "attentest", version, about = "Attention test battery: CPT, IMT/DMT and TOVA")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulated session and write reports
    Run {
        /// Test to run: cpt, imt-dmt, tova
        #[arg(long)]
        test: TestKind,

        /// IMT/DMT mode: imt, dmt, both
        #[arg(long)]
        mode: Option<MemoryMode>,

        /// Seed for stimulus and responder randomness
        #[arg(long)]
        seed: Option<u64>,

        /// Simulated participant: attentive, inattentive, impulsive
        #[arg(long, default_value = "attentive")]
        profile: ResponderProfile,

        /// Participant name
        #[arg(long, default_value = "Simulated Participant")]
        name: String,

        /// Participant age in years
        #[arg(long, default_value = "30")]
        age: u32,

        /// Participant gender
        #[arg(long, default_value = "unspecified")]
        gender: String,

        /// Session date (defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Test duration in seconds, overriding the config
        #[arg(long)]
        duration: Option<u64>,

        /// Output directory, overriding the config
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: json, csv, html, png, all
        #[arg(long, default_value = "all")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the summary of a saved session
    Show {
        /// Results JSON written by `run`
        #[arg(long)]
        results: PathBuf,
    },

    /// Load and validate a config file
    Validate {
        /// Config file path (defaults to the usual search locations)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter attentest.toml
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("attentest=info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            test,
            mode,
            seed,
            profile,
            name,
            age,
            gender,
            date,
            duration,
            output,
            format,
            config,
        } => commands::run::execute(commands::run::RunArgs {
            test,
            mode,
            seed,
            profile,
            name,
            age,
            gender,
            date,
            duration,
            output,
            format,
            config,
        }),
        Commands::Show { results } => commands::show::execute(results),
        Commands::Validate { config } => commands::validate::execute(config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
