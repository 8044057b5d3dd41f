//! The `attentest show` command, plus the summary table shared with `run`.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use attentest_core::results::{PhaseResult, SessionResults};
use attentest_report::summary::OverallAssessment;

pub fn execute(path: PathBuf) -> Result<()> {
    let results = SessionResults::load_json(&path)?;
    println!("{}", headline(&results));
    println!("{}", summary_table(&results));
    if let Some(line) = overall_line(&results) {
        println!("{line}");
    }
    Ok(())
}

pub fn headline(results: &SessionResults) -> String {
    let p = &results.participant;
    let mut line = format!(
        "{} session {} | {} ({} years, {}) | {}",
        results.kind, results.id, p.name, p.age, p.gender, p.date
    );
    if let Some(mode) = results.memory_mode {
        line.push_str(&format!(" | mode {mode}"));
    }
    line
}

/// One column per phase, one row per metric.
pub fn summary_table(results: &SessionResults) -> Table {
    let mut table = Table::new();
    let mut header = vec![Cell::new("Metric")];
    header.extend(results.phases.keys().map(|id| Cell::new(id.title())));
    table.set_header(header);

    let rows: [(&str, fn(&PhaseResult) -> String); 12] = [
        ("Total Stimuli", |p| p.counters.stimuli_shown.to_string()),
        ("Targets", |p| p.counters.target_stimuli.to_string()),
        ("Correct", |p| p.counters.correct_responses.to_string()),
        ("Commission Errors", |p| p.counters.commission_errors.to_string()),
        ("Omission Errors", |p| p.counters.omission_errors.to_string()),
        ("Anticipatory", |p| p.counters.anticipatory_responses.to_string()),
        ("Multiple Responses", |p| p.counters.multiple_responses.to_string()),
        ("Hit Rate", |p| format!("{:.3}", p.hit_rate)),
        ("False Alarm Rate", |p| format!("{:.3}", p.false_alarm_rate)),
        ("d'", |p| format!("{:.2}", p.d_prime)),
        ("Mean RT (ms)", |p| format!("{:.1}", p.mean_rt)),
        ("RT SD (ms)", |p| format!("{:.1}", p.rt_std)),
    ];
    for (label, value) in rows {
        let mut row = vec![Cell::new(label)];
        row.extend(results.phases.values().map(|p| Cell::new(value(p))));
        table.add_row(row);
    }

    if results.phases.values().any(|p| p.acs_score.is_some()) {
        let mut row = vec![Cell::new("ACS")];
        row.extend(results.phases.values().map(|p| {
            Cell::new(
                p.acs_score
                    .map(|acs| format!("{acs:.1}"))
                    .unwrap_or_else(|| "-".into()),
            )
        }));
        table.add_row(row);
    }
    table
}

pub fn overall_line(results: &SessionResults) -> Option<String> {
    let overall = OverallAssessment::from_results(results)?;
    let improvement = match (overall.rt_improvement_ms, overall.rt_improvement_percent) {
        (Some(ms), Some(pct)) => format!("{ms:.1} ms ({pct:.1}%)"),
        _ => "n/a".into(),
    };
    Some(format!(
        "Overall ACS {:.1}/100 | indicator likelihood {} | RT improvement {}",
        overall.overall_acs, overall.likelihood, improvement
    ))
}
