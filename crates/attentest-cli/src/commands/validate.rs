//! The `attentest validate` command.

use std::path::PathBuf;

use anyhow::Result;

use attentest_core::config::load_config_from;

pub fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    config.validate()?;

    let source = config_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "default search path".into());
    println!("Config: {source}");
    println!("  output_dir: {}", config.output_dir.display());
    println!(
        "  cpt:    {} s, target '{}' at {:.1}%",
        config.cpt.duration_secs,
        config.cpt.target_symbol,
        config.cpt.target_ratio * 100.0
    );
    println!(
        "  memory: {} s, mode {}, delay {}, {} digits",
        config.memory.duration_secs,
        config.memory.mode,
        config.memory.delay,
        config.memory.stimulus_length
    );
    println!(
        "  tova:   {} s, targets {:.1}% then {:.1}%",
        config.tova.duration_secs,
        config.tova.infrequent_ratio * 100.0,
        config.tova.frequent_ratio * 100.0
    );
    println!("Config valid.");

    Ok(())
}
