//! PNG results plot.
//!
//! One row per phase that showed stimuli: a response-time histogram on the
//! left and a correct/commission/omission bar chart on the right. A TOVA
//! session with both halves gets a final comparison row of grouped bars.
//! The plot carries no text; the HTML report supplies the captions.

use std::path::Path;

use anyhow::{Context, Result};
use tiny_skia::{Color, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

use attentest_core::model::TestKind;
use attentest_core::results::{PhaseResult, SessionResults};

pub const HISTOGRAM_BINS: usize = 20;

const WIDTH: u32 = 1200;
const ROW_HEIGHT: u32 = 360;
const MARGIN: f32 = 40.0;

const BACKGROUND: [u8; 3] = [255, 255, 255];
const AXIS: [u8; 3] = [55, 65, 81];
const HISTOGRAM: [u8; 3] = [33, 150, 243];
const CORRECT: [u8; 3] = [76, 175, 80];
const COMMISSION: [u8; 3] = [255, 152, 0];
const OMISSION: [u8; 3] = [244, 67, 54];
const PHASE_COLORS: [[u8; 3]; 2] = [[33, 150, 243], [156, 39, 176]];

/// Upper edge of the histogram range: the slowest latency rounded up to
/// the next 100 ms, never below 100 ms.
pub fn histogram_upper(times: &[f64]) -> f64 {
    let max = times.iter().copied().fold(0.0_f64, f64::max);
    ((max / 100.0).floor() + 1.0).max(1.0) * 100.0
}

/// Count latencies into `bins` equal-width bins over `[0, upper)`.
/// Values outside the range are clamped into the first or last bin.
pub fn histogram(times: &[f64], bins: usize, upper: f64) -> Vec<u32> {
    let mut counts = vec![0u32; bins];
    if bins == 0 || upper <= 0.0 {
        return counts;
    }
    let width = upper / bins as f64;
    for &t in times {
        let idx = ((t.max(0.0) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    counts
}

/// Render the results plot.
///
/// Placeholder phases with no stimuli are left out.
pub fn render_plot(results: &SessionResults) -> Result<Pixmap> {
    let shown: Vec<&PhaseResult> = results
        .phases
        .values()
        .filter(|p| p.counters.stimuli_shown > 0)
        .collect();
    let compare = results.kind == TestKind::Tova && shown.len() > 1;
    let rows = (shown.len() + usize::from(compare)).max(1) as u32;

    let mut pixmap =
        Pixmap::new(WIDTH, ROW_HEIGHT * rows).context("plot dimensions are invalid")?;
    pixmap.fill(color(BACKGROUND));

    for (row, phase) in shown.iter().enumerate() {
        let top = row as f32 * ROW_HEIGHT as f32;
        draw_phase_row(&mut pixmap, top, phase);
    }
    if compare {
        let top = shown.len() as f32 * ROW_HEIGHT as f32;
        draw_comparison_row(&mut pixmap, top, &shown);
    }
    Ok(pixmap)
}

/// Render and save the plot as PNG.
pub fn write_plot(results: &SessionResults, path: &Path) -> Result<()> {
    let pixmap = render_plot(results)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    pixmap
        .save_png(path)
        .with_context(|| format!("failed to write plot to {}", path.display()))?;
    tracing::debug!(path = %path.display(), "plot written");
    Ok(())
}

fn draw_phase_row(pixmap: &mut Pixmap, top: f32, phase: &PhaseResult) {
    let panel_w = WIDTH as f32 / 2.0 - 2.0 * MARGIN;
    let panel_h = ROW_HEIGHT as f32 - 2.0 * MARGIN;
    let baseline = top + MARGIN + panel_h;

    // Response-time histogram
    let left = MARGIN;
    let upper = histogram_upper(&phase.response_times);
    let counts = histogram(&phase.response_times, HISTOGRAM_BINS, upper);
    let peak = counts.iter().copied().max().unwrap_or(0).max(1) as f32;
    let bin_w = panel_w / HISTOGRAM_BINS as f32;
    for (i, &count) in counts.iter().enumerate() {
        let h = count as f32 / peak * panel_h;
        fill(pixmap, left + i as f32 * bin_w + 1.0, baseline - h, bin_w - 2.0, h, HISTOGRAM);
    }
    draw_axes(pixmap, left, top + MARGIN, panel_w, panel_h);

    // Outcome counts
    let left = WIDTH as f32 / 2.0 + MARGIN;
    let c = &phase.counters;
    let bars = [
        (c.correct_responses, CORRECT),
        (c.commission_errors, COMMISSION),
        (c.omission_errors, OMISSION),
    ];
    let peak = bars.iter().map(|(n, _)| *n).max().unwrap_or(0).max(1) as f32;
    let slot = panel_w / bars.len() as f32;
    for (i, (n, rgb)) in bars.iter().enumerate() {
        let h = *n as f32 / peak * panel_h;
        fill(pixmap, left + i as f32 * slot + slot * 0.2, baseline - h, slot * 0.6, h, *rgb);
    }
    draw_axes(pixmap, left, top + MARGIN, panel_w, panel_h);
}

/// Grouped bars, one bar per phase: mean and spread of response time on the
/// left, hit/false-alarm/omission rates on the right.
fn draw_comparison_row(pixmap: &mut Pixmap, top: f32, phases: &[&PhaseResult]) {
    let panel_w = WIDTH as f32 / 2.0 - 2.0 * MARGIN;
    let panel_h = ROW_HEIGHT as f32 - 2.0 * MARGIN;

    let timing: Vec<Vec<f64>> = phases.iter().map(|p| vec![p.mean_rt, p.rt_std]).collect();
    let peak = timing.iter().flatten().copied().fold(0.0_f64, f64::max).max(1.0);
    draw_grouped_bars(pixmap, MARGIN, top, panel_w, panel_h, &timing, peak);

    let rates: Vec<Vec<f64>> = phases
        .iter()
        .map(|p| vec![p.hit_rate, p.false_alarm_rate, p.omission_rate])
        .collect();
    let left = WIDTH as f32 / 2.0 + MARGIN;
    draw_grouped_bars(pixmap, left, top, panel_w, panel_h, &rates, 1.0);
}

/// `series[phase][metric]`, scaled so `peak` fills the panel height.
fn draw_grouped_bars(
    pixmap: &mut Pixmap,
    left: f32,
    top: f32,
    panel_w: f32,
    panel_h: f32,
    series: &[Vec<f64>],
    peak: f64,
) {
    let baseline = top + MARGIN + panel_h;
    let groups = series.iter().map(Vec::len).max().unwrap_or(0).max(1);
    let slot = panel_w / groups as f32;
    let bar_w = slot * 0.8 / series.len().max(1) as f32;

    for (i, values) in series.iter().enumerate() {
        let rgb = PHASE_COLORS[i % PHASE_COLORS.len()];
        for (g, &value) in values.iter().enumerate() {
            let h = (value / peak).clamp(0.0, 1.0) as f32 * panel_h;
            let x = left + g as f32 * slot + slot * 0.1 + i as f32 * bar_w;
            fill(pixmap, x, baseline - h, bar_w - 2.0, h, rgb);
        }
    }
    draw_axes(pixmap, left, top + MARGIN, panel_w, panel_h);
}

fn color(rgb: [u8; 3]) -> Color {
    Color::from_rgba8(rgb[0], rgb[1], rgb[2], 255)
}

fn fill(pixmap: &mut Pixmap, x: f32, y: f32, w: f32, h: f32, rgb: [u8; 3]) {
    let mut paint = Paint::default();
    paint.set_color(color(rgb));
    // zero-height bars have no rect
    if let Some(rect) = Rect::from_xywh(x, y, w, h) {
        pixmap.fill_rect(rect, &paint, Transform::identity(), None);
    }
}

fn draw_axes(pixmap: &mut Pixmap, x: f32, y: f32, w: f32, h: f32) {
    let mut paint = Paint::default();
    paint.set_color(color(AXIS));
    paint.anti_alias = true;

    let mut path = PathBuilder::new();
    path.move_to(x, y);
    path.line_to(x, y + h);
    path.line_to(x + w, y + h);
    let Some(path) = path.finish() else {
        return;
    };
    let stroke = Stroke {
        width: 2.0,
        ..Default::default()
    };
    pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
}
