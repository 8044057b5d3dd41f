//! CSV exports: one summary row per session plus one response-time file per
//! phase.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use attentest_core::model::PhaseId;
use attentest_core::results::SessionResults;

use crate::summary::OverallAssessment;

/// Quote a field when it contains a delimiter, quote or line break.
pub fn escape_csv(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Header and value rows of the summary CSV.
pub fn results_table(results: &SessionResults) -> (Vec<String>, Vec<String>) {
    let p = &results.participant;
    let mut header: Vec<String> = ["Name", "Age", "Gender", "Date", "Test_Type"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let mut row = vec![
        p.name.clone(),
        p.age.to_string(),
        p.gender.clone(),
        p.date.clone(),
        results.kind.to_string(),
    ];

    for (id, phase) in &results.phases {
        for (name, value) in phase.scalar_metrics() {
            header.push(format!("{}_{name}", id.key()));
            row.push(value.to_string());
        }
    }

    if let Some(overall) = OverallAssessment::from_results(results) {
        header.push("Overall_ACS_Score".into());
        row.push(overall.overall_acs.to_string());
        if let (Some(ms), Some(pct)) = (overall.rt_improvement_ms, overall.rt_improvement_percent) {
            header.push("RT_Improvement_ms".into());
            row.push(ms.to_string());
            header.push("RT_Improvement_percent".into());
            row.push(pct.to_string());
        }
    }

    (header, row)
}

/// Render the summary CSV.
pub fn results_csv(results: &SessionResults) -> String {
    let (header, row) = results_table(results);
    let line = |fields: &[String]| {
        fields
            .iter()
            .map(|f| escape_csv(f))
            .collect::<Vec<_>>()
            .join(",")
    };
    format!("{}\n{}\n", line(&header), line(&row))
}

/// Render one phase's response-time series.
pub fn response_times_csv(phase: PhaseId, times: &[f64]) -> String {
    let mut out = format!("{}_response_times_ms\n", phase.key());
    for t in times {
        out.push_str(&t.to_string());
        out.push('\n');
    }
    out
}

pub fn write_results_csv(results: &SessionResults, path: &Path) -> Result<()> {
    std::fs::write(path, results_csv(results))
        .with_context(|| format!("failed to write {}", path.display()))
}

/// Write `<base>_<phase>_response_times.csv` for every phase with at least
/// one correct response.
pub fn write_response_time_csvs(
    results: &SessionResults,
    dir: &Path,
    base: &str,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for (id, phase) in &results.phases {
        if phase.response_times.is_empty() {
            continue;
        }
        let path = dir.join(format!("{base}_{}_response_times.csv", id.key()));
        std::fs::write(&path, response_times_csv(*id, &phase.response_times))
            .with_context(|| format!("failed to write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{phase_result, session};
    use attentest_core::model::TestKind;
    use attentest_core::results::PhaseResult;

    #[test]
    fn escape_quotes_only_when_needed() {
        assert_eq!(escape_csv("Ada"), "Ada");
        assert_eq!(escape_csv("Lovelace, Ada"), "\"Lovelace, Ada\"");
        assert_eq!(escape_csv("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn summary_row_has_prefixed_phase_columns() {
        let results = session(
            TestKind::ImtDmt,
            vec![
                (PhaseId::Imt, phase_result(450.0)),
                (PhaseId::Dmt, PhaseResult::empty()),
            ],
        );
        let csv = results_csv(&results);
        let mut lines = csv.lines();
        let header = lines.next().unwrap();
        let row = lines.next().unwrap();

        assert!(header.starts_with("Name,Age,Gender,Date,Test_Type,IMT_total_stimuli"));
        assert!(header.contains("IMT_hit_rate"));
        assert!(header.contains("DMT_d_prime"));
        assert!(!header.contains("Overall_ACS_Score"));
        assert!(row.starts_with("\"Doe, Jane\",41,female,2026-10-16,IMT/DMT,"));
        assert_eq!(header.split(',').count(), row.split(',').count() - 1);
    }

    #[test]
    fn tova_row_includes_overall_columns() {
        let mut infrequent = phase_result(420.0);
        infrequent.acs_score = Some(55.0);
        let mut frequent = phase_result(400.0);
        frequent.acs_score = Some(65.0);
        let results = session(
            TestKind::Tova,
            vec![
                (PhaseId::InfrequentTargets, infrequent),
                (PhaseId::FrequentTargets, frequent),
            ],
        );
        let (header, row) = results_table(&results);
        let idx = header.iter().position(|h| h == "Overall_ACS_Score").unwrap();
        assert_eq!(row[idx], "60");
        assert!(header.iter().any(|h| h == "RT_Improvement_percent"));
        assert!(header.iter().any(|h| h == "infrequent_targets_acs_score"));
    }

    #[test]
    fn response_time_files_skip_empty_phases() {
        let dir = tempfile::tempdir().unwrap();
        let results = session(
            TestKind::ImtDmt,
            vec![
                (PhaseId::Imt, phase_result(450.0)),
                (PhaseId::Dmt, PhaseResult::empty()),
            ],
        );
        let files = write_response_time_csvs(&results, dir.path(), "IMT_DMT_Report_x").unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("IMT_DMT_Report_x_IMT_response_times.csv"));

        let content = std::fs::read_to_string(&files[0]).unwrap();
        assert_eq!(content, "IMT_response_times_ms\n440\n460\n");
    }
}
