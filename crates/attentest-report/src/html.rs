//! HTML report generator.
//!
//! Produces a single HTML file with inlined CSS. The plot is referenced by
//! file name and is expected next to the HTML file.

use anyhow::{Context, Result};
use std::path::Path;

use attentest_core::model::{PhaseId, TestKind};
use attentest_core::results::{PhaseResult, SessionResults};

use crate::summary::OverallAssessment;

/// Escape a string for safe HTML insertion.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn heading(kind: TestKind) -> &'static str {
    match kind {
        TestKind::Cpt => "CPT Test Results",
        TestKind::ImtDmt => "Immediate and Delayed Memory Task (IMT/DMT) Results",
        TestKind::Tova => "TOVA Test Results",
    }
}

/// Generate the HTML report for a session.
///
/// `plot_file` is the PNG file name to embed, if one was written.
pub fn generate_html(results: &SessionResults, plot_file: Option<&str>) -> String {
    let p = &results.participant;
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>{} report: {}</title>\n",
        results.kind,
        html_escape(&p.name)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str(&format!("<h1>{}</h1>\n", heading(results.kind)));
    html.push_str(&format!(
        "<p class=\"meta\"><strong>Participant:</strong> {} ({} years, {})</p>\n",
        html_escape(&p.name),
        p.age,
        html_escape(&p.gender)
    ));
    html.push_str(&format!(
        "<p class=\"meta\"><strong>Test Date:</strong> {}</p>\n",
        html_escape(&p.date)
    ));
    html.push_str("</header>\n");

    if let Some(file) = plot_file {
        html.push_str("<section class=\"plot\">\n");
        html.push_str("<h2>Results Visualization</h2>\n");
        html.push_str(&format!(
            "<img class=\"plot-img\" src=\"{}\" alt=\"{} results plot\">\n",
            html_escape(file),
            results.kind
        ));
        html.push_str("</section>\n");
    }

    if let Some(overall) = OverallAssessment::from_results(results) {
        html.push_str(&overall_section(&overall));
    }

    for (id, phase) in &results.phases {
        html.push_str(&phase_section(*id, phase));
    }

    html.push_str("<section class=\"interpretation\">\n");
    html.push_str(interpretation(results.kind));
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(results).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("<footer>\n");
    let generated = results.ended_at.unwrap_or(results.started_at);
    html.push_str(&format!(
        "<p>Report generated on {}</p>\n",
        generated.format("%Y-%m-%d at %H:%M:%S UTC")
    ));
    html.push_str(&format!("<p class=\"meta\">Session {}</p>\n", results.id));
    html.push_str("</footer>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(
    results: &SessionResults,
    plot_file: Option<&str>,
    path: &Path,
) -> Result<()> {
    let html = generate_html(results, plot_file);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

fn overall_section(overall: &OverallAssessment) -> String {
    let mut html = String::new();
    html.push_str("<section class=\"summary\">\n");
    html.push_str("<h2>Overall Assessment</h2>\n");
    html.push_str("<table class=\"summary-table\">\n");
    html.push_str(&format!(
        "<tr><th>Overall Attention Comparison Score</th><td>{:.1}/100</td></tr>\n",
        overall.overall_acs
    ));
    html.push_str(&format!(
        "<tr><th>Indicator Likelihood</th><td><span class=\"likelihood\" style=\"color:{}\">{}</span></td></tr>\n",
        overall.likelihood.color(),
        overall.likelihood
    ));
    let improvement = match (overall.rt_improvement_ms, overall.rt_improvement_percent) {
        (Some(ms), Some(pct)) => format!("{ms:.1} ms ({pct:.1}%)"),
        _ => "n/a".to_string(),
    };
    html.push_str(&format!(
        "<tr><th>RT Improvement</th><td>{improvement}</td></tr>\n"
    ));
    html.push_str("</table>\n</section>\n");
    html
}

fn phase_section(id: PhaseId, phase: &PhaseResult) -> String {
    let c = &phase.counters;
    let mut rows: Vec<(&str, String)> = vec![
        ("Total Stimuli", c.stimuli_shown.to_string()),
        ("Target Stimuli", c.target_stimuli.to_string()),
        ("Non-Target Stimuli", c.non_target_stimuli.to_string()),
        ("Correct Responses", c.correct_responses.to_string()),
        ("Commission Errors", c.commission_errors.to_string()),
        ("Omission Errors", c.omission_errors.to_string()),
        ("Anticipatory Responses", c.anticipatory_responses.to_string()),
        ("Multiple Responses", c.multiple_responses.to_string()),
    ];
    if id == PhaseId::InfrequentTargets || id == PhaseId::FrequentTargets {
        rows.push(("Post-Commission Errors", c.post_commission_errors.to_string()));
    }
    rows.extend([
        ("Mean Response Time", format!("{:.1} ms", phase.mean_rt)),
        ("Median Response Time", format!("{:.1} ms", phase.median_rt)),
        ("Response Time Variability (SD)", format!("{:.1} ms", phase.rt_std)),
        ("Hit Rate", format!("{:.3}", phase.hit_rate)),
        ("False Alarm Rate", format!("{:.3}", phase.false_alarm_rate)),
        ("Omission Rate", format!("{:.3}", phase.omission_rate)),
        ("d'", format!("{:.2}", phase.d_prime)),
    ]);
    if let Some(acs) = phase.acs_score {
        rows.push(("Attention Comparison Score", format!("{acs:.1}/100")));
    }

    let mut html = String::new();
    html.push_str(&format!("<section class=\"phase\" id=\"{}\">\n", id.key()));
    html.push_str(&format!("<h2>{}</h2>\n", id.title()));
    html.push_str("<table class=\"results-table\">\n");
    html.push_str("<thead><tr><th>Metric</th><th>Value</th></tr></thead>\n<tbody>\n");
    for (label, value) in rows {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td></tr>\n",
            html_escape(label),
            value
        ));
    }
    html.push_str("</tbody></table>\n</section>\n");
    html
}

fn interpretation(kind: TestKind) -> &'static str {
    match kind {
        TestKind::Cpt => INTERPRET_CPT,
        TestKind::ImtDmt => INTERPRET_MEMORY,
        TestKind::Tova => INTERPRET_TOVA,
    }
}

const INTERPRET_CPT: &str = concat!(
    "<h2>Interpretation</h2>\n",
    "<p>The Continuous Performance Task measures sustained attention and inhibitory control.</p>\n<ul>\n",
    "<li><strong>Hit Rate:</strong> proportion of targets that were answered. Higher values indicate better sustained attention.</li>\n",
    r#"<li><strong>False Alarm Rate:</strong> proportion of non-targets that drew a response. Lower values indicate better inhibitory control.</li>
<li><strong>d':</strong> sensitivity combining hit and false alarm rates. Higher values indicate better discrimination of targets from non-targets.</li>
"#,
    "<li><strong>Response Time:</strong> speed of correct responses. Consistent response times suggest sustained attention.</li>\n",
    "</ul>\n",
);

const INTERPRET_MEMORY: &str = concat!(
    "<h2>Interpretation</h2>\n",
    "<p>The Immediate and Delayed Memory Tasks measure attention, working memory and impulsivity.</p>\n<ul>\n",
    "<li><strong>Hit Rate:</strong> proportion of matching numbers that were answered. Higher values indicate better working memory.</li>\n",
    r#"<li><strong>False Alarm Rate:</strong> proportion of non-targets that drew a response. Lower values indicate better inhibitory control.</li>
<li><strong>d':</strong> sensitivity combining hit and false alarm rates. Higher values indicate better discrimination of targets from non-targets.</li>
"#,
    "<li><strong>Response Time:</strong> speed of correct responses.</li>\n",
    "</ul>\n",
    "<p>The delayed phase is usually harder, since each number has to be held in memory across the intervening stimuli.</p>\n",
);

const INTERPRET_TOVA: &str = concat!(
    "<h2>Interpretation Guide</h2>\n",
    "<p>The Test of Variables of Attention runs in two halves.</p>\n<ul>\n",
    "<li><strong>Infrequent Targets:</strong> targets appear 22.5% of the time. This half mainly measures sustained attention.</li>\n",
    "<li><strong>Frequent Targets:</strong> targets appear 77.5% of the time. This half mainly measures inhibitory control.</li>\n",
    "</ul>\n<ul>\n",
    "<li><strong>Omission Errors:</strong> missed targets, a sign of inattention.</li>\n",
    "<li><strong>Commission Errors:</strong> responses to non-targets, a sign of impulsivity.</li>\n",
    "<li><strong>Response Time Variability:</strong> inconsistency of correct-response latencies.</li>\n",
    "<li><strong>ACS:</strong> composite score from 0 to 100; lower scores indicate greater attention difficulties.</li>\n",
    "</ul>\n",
    "<p><strong>Note:</strong> this battery is for education and demonstration only and is not a clinical diagnostic tool.</p>\n",
);

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --muted: #6b7280; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --muted: #9ca3af; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0 auto; max-width: 960px; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: var(--muted); margin: 0.25rem 0; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); }
.plot-img { max-width: 100%; border: 1px solid var(--border); border-radius: 8px; }
.likelihood { font-weight: bold; }
.interpretation { padding: 1rem 1.5rem; border-left: 4px solid var(--border); }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
footer { margin-top: 3rem; color: var(--muted); font-size: 0.85rem; }
"#;
