//! attentest-report: Report writers for finished attention-test sessions.
//!
//! Every writer takes a [`SessionResults`] and produces files next to each
//! other in one output directory, all sharing a base name derived from the
//! test, participant and session time.

pub mod csv;
pub mod html;
pub mod plot;
pub mod summary;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};

use attentest_core::model::TestKind;
use attentest_core::results::SessionResults;

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportFormat {
    Json,
    Csv,
    Html,
    Png,
}

impl ReportFormat {
    pub const ALL: [ReportFormat; 4] = [
        ReportFormat::Json,
        ReportFormat::Csv,
        ReportFormat::Html,
        ReportFormat::Png,
    ];

    /// Parse a comma-separated list such as `json,html`, or `all`.
    pub fn parse_list(s: &str) -> Result<Vec<ReportFormat>, String> {
        let mut formats = Vec::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            if part.eq_ignore_ascii_case("all") {
                return Ok(Self::ALL.to_vec());
            }
            let format: ReportFormat = part.parse()?;
            if !formats.contains(&format) {
                formats.push(format);
            }
        }
        if formats.is_empty() {
            return Err("no report format given".into());
        }
        Ok(formats)
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "csv" => Ok(ReportFormat::Csv),
            "html" => Ok(ReportFormat::Html),
            "png" => Ok(ReportFormat::Png),
            other => Err(format!("unknown report format: {other}")),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Json => write!(f, "json"),
            ReportFormat::Csv => write!(f, "csv"),
            ReportFormat::Html => write!(f, "html"),
            ReportFormat::Png => write!(f, "png"),
        }
    }
}

/// Paths written by [`write_reports`].
#[derive(Debug, Clone, Default)]
pub struct ReportFiles {
    pub json: Option<PathBuf>,
    pub csv: Option<PathBuf>,
    pub response_times: Vec<PathBuf>,
    pub html: Option<PathBuf>,
    pub plot: Option<PathBuf>,
}

impl ReportFiles {
    /// All written paths in a stable order.
    pub fn all(&self) -> Vec<&Path> {
        let mut paths: Vec<&Path> = Vec::new();
        paths.extend(self.json.as_deref());
        paths.extend(self.csv.as_deref());
        paths.extend(self.response_times.iter().map(PathBuf::as_path));
        paths.extend(self.plot.as_deref());
        paths.extend(self.html.as_deref());
        paths
    }
}

fn prefix(kind: TestKind) -> &'static str {
    match kind {
        TestKind::Cpt => "CPT",
        TestKind::ImtDmt => "IMT_DMT",
        TestKind::Tova => "TOVA",
    }
}

/// `<PREFIX>_Report_<Name_With_Underscores>_<YYYYmmdd_HHMMSS>`, stamped with
/// the session end time (or start time while unfinished).
pub fn base_filename(results: &SessionResults) -> String {
    let stamp = results.ended_at.unwrap_or(results.started_at);
    let name = results.participant.name.trim().replace(' ', "_");
    let name: String = name
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        .collect();
    format!(
        "{}_Report_{}_{}",
        prefix(results.kind),
        name,
        stamp.format("%Y%m%d_%H%M%S")
    )
}

/// Write the requested formats into `dir`, creating it if needed.
pub fn write_reports(
    results: &SessionResults,
    dir: &Path,
    formats: &[ReportFormat],
) -> Result<ReportFiles> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;
    let base = base_filename(results);
    let mut files = ReportFiles::default();

    if formats.contains(&ReportFormat::Json) {
        let path = dir.join(format!("{base}.json"));
        results.save_json(&path)?;
        files.json = Some(path);
    }

    if formats.contains(&ReportFormat::Csv) {
        let path = dir.join(format!("{base}.csv"));
        csv::write_results_csv(results, &path)?;
        files.csv = Some(path);
        files.response_times = csv::write_response_time_csvs(results, dir, &base)?;
    }

    if formats.contains(&ReportFormat::Png) {
        let path = dir.join(format!("{base}.png"));
        plot::write_plot(results, &path)?;
        files.plot = Some(path);
    }

    if formats.contains(&ReportFormat::Html) {
        let path = dir.join(format!("{base}.html"));
        let plot_file = files.plot.as_ref().map(|_| format!("{base}.png"));
        html::write_html_report(results, plot_file.as_deref(), &path)?;
        files.html = Some(path);
    }

    tracing::info!(
        base = %base,
        dir = %dir.display(),
        count = files.all().len(),
        "reports written"
    );
    Ok(files)
}


#[cfg(test)]
mod tests {
    use super::*;
    use attentest_core::model::PhaseId;
    use test_support::{phase_result, session};

    #[test]
    fn format_list_parsing() {
        assert_eq!(
            ReportFormat::parse_list("json, HTML").unwrap(),
            vec![ReportFormat::Json, ReportFormat::Html]
        );
        assert_eq!(ReportFormat::parse_list("all").unwrap().len(), 4);
        assert_eq!(ReportFormat::parse_list("csv,csv").unwrap().len(), 1);
        assert!(ReportFormat::parse_list("pdf").is_err());
        assert!(ReportFormat::parse_list("").is_err());
    }

    #[test]
    fn base_filename_uses_prefix_name_and_end_time() {
        let mut results = session(TestKind::ImtDmt, vec![]);
        results.participant.name = "Jane Q Doe".into();
        assert_eq!(base_filename(&results), "IMT_DMT_Report_Jane_Q_Doe_20261016_093000");

        results.ended_at = None;
        results.kind = TestKind::Tova;
        assert_eq!(base_filename(&results), "TOVA_Report_Jane_Q_Doe_20261016_091000");
    }

    #[test]
    fn base_filename_drops_path_separators() {
        let mut results = session(TestKind::Cpt, vec![]);
        results.participant.name = "../etc/x".into();
        assert_eq!(base_filename(&results), "CPT_Report_..etcx_20261016_093000");
    }

    #[test]
    fn writes_every_format_with_shared_base_name() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("reports");
        let results = session(TestKind::Cpt, vec![(PhaseId::Cpt, phase_result(400.0))]);

        let files = write_reports(&results, &out, &ReportFormat::ALL).unwrap();
        let base = base_filename(&results);

        assert_eq!(files.json.as_deref(), Some(out.join(format!("{base}.json")).as_path()));
        assert_eq!(files.response_times.len(), 1);
        assert_eq!(files.all().len(), 5);
        for path in files.all() {
            assert!(path.exists(), "{} missing", path.display());
        }

        let html = std::fs::read_to_string(files.html.unwrap()).unwrap();
        assert!(html.contains(&format!("src=\"{base}.png\"")));
    }

    #[test]
    fn html_without_png_has_no_image() {
        let dir = tempfile::tempdir().unwrap();
        let results = session(TestKind::Cpt, vec![(PhaseId::Cpt, phase_result(400.0))]);
        let files = write_reports(&results, dir.path(), &[ReportFormat::Html]).unwrap();

        assert!(files.plot.is_none() && files.json.is_none());
        let html = std::fs::read_to_string(files.html.unwrap()).unwrap();
        assert!(!html.contains("<img"));
    }
}
