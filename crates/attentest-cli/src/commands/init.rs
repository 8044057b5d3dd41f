//! The `attentest init` command.

use std::path::Path;

use anyhow::{Context, Result};

use attentest_core::config::BatteryConfig;

const CONFIG_FILE: &str = "attentest.toml";

pub fn execute() -> Result<()> {
    if Path::new(CONFIG_FILE).exists() {
        println!("{CONFIG_FILE} already exists, skipping.");
        return Ok(());
    }

    let body = BatteryConfig::default().to_toml()?;
    std::fs::write(CONFIG_FILE, format!("{HEADER}{body}"))
        .with_context(|| format!("failed to write {CONFIG_FILE}"))?;
    println!("Created {CONFIG_FILE}");

    println!("\nNext steps:");
    println!("  1. Adjust durations and ratios in {CONFIG_FILE}");
    println!("  2. Run: attentest validate --config {CONFIG_FILE}");
    println!("  3. Run: attentest run --test tova --name \"Jane Doe\"");

    Ok(())
}

const HEADER: &str = "# attentest configuration
# Durations are in seconds, stimulus timings in milliseconds.

";
