//! Plain-text rendering of engine results for the terminal.
//!
//! Rendering only formats; every number shown comes from the engine.

use std::fmt::Write as _;

use serde::Serialize;

use sanity_core::model::{
    EngineWarning, EvaluateResult, LabSession, MonteCarloResult, SavedSession, SweepResult,
};
use sanity_core::units::display_label;

/// Width of the longest histogram bar in characters
const HISTOGRAM_WIDTH: usize = 40;

/// All three analyses of one session, as printed by `sanity report`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub session: LabSession,
    pub evaluation: EvaluateResult,
    pub sweep: SweepResult,
    pub monte_carlo: MonteCarloResult,
}

/// Format a number compactly: fixed notation for everyday magnitudes,
/// scientific otherwise.
pub fn format_number(value: f64) -> String {
    let magnitude = value.abs();
    if value == 0.0 {
        "0".to_string()
    } else if !(1e-3..1e6).contains(&magnitude) {
        format!("{value:.4e}")
    } else {
        let fixed = format!("{value:.6}");
        fixed.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

fn format_optional(value: Option<f64>) -> String {
    value.map(format_number).unwrap_or_else(|| "—".to_string())
}

pub fn render_warnings(warnings: &[EngineWarning]) -> String {
    let mut out = String::new();
    for warning in warnings {
        let _ = writeln!(out, "  warning: {warning}");
    }
    out
}

pub fn render_session(session: &LabSession) -> String {
    let mut out = String::new();
    if let Some(title) = &session.title {
        let _ = writeln!(out, "{title}");
    }
    let _ = writeln!(out, "formula: {}", session.formula);
    if let Some(expected) = session.expected_unit() {
        let _ = writeln!(out, "expected unit: {expected}");
    }
    for v in &session.variables {
        let range = match (v.min, v.max) {
            (Some(min), Some(max)) => format!(" [{}, {}]", format_number(min), format_number(max)),
            _ => String::new(),
        };
        let distribution = match v.distribution {
            Some(d) => format!(" {d:?}").to_lowercase(),
            None => String::new(),
        };
        let _ = writeln!(
            out,
            "  {} = {} {}{range}{distribution}",
            v.symbol,
            format_number(v.value),
            display_label(&v.unit),
        );
    }
    out
}

pub fn render_evaluate(result: &EvaluateResult) -> String {
    let mut out = String::new();
    match (&result.error, result.value) {
        (Some(error), _) => {
            let _ = writeln!(out, "error: {error}");
        }
        (None, Some(value)) => {
            let _ = writeln!(
                out,
                "result: {} {}",
                format_number(value),
                display_label(&result.unit)
            );
        }
        (None, None) => {
            let _ = writeln!(out, "result: —");
        }
    }
    out.push_str(&render_warnings(&result.warnings));
    out
}

pub fn render_sweep(result: &SweepResult) -> String {
    let mut out = String::new();
    if let Some(error) = &result.error {
        let _ = writeln!(out, "sweep error: {error}");
    }
    if !result.points.is_empty() {
        let x_header = format!("x ({})", display_label(&result.x_unit));
        let y_header = format!("y ({})", display_label(&result.y_unit));
        let _ = writeln!(out, "{x_header:>16}  {y_header:>16}");
        for point in &result.points {
            let _ = writeln!(
                out,
                "{:>16}  {:>16}",
                format_number(point.x),
                format_optional(point.y)
            );
        }
    }
    out.push_str(&render_warnings(&result.warnings));
    out
}

pub fn render_monte_carlo(result: &MonteCarloResult) -> String {
    let mut out = String::new();
    if let Some(error) = &result.error {
        let _ = writeln!(out, "monte carlo error: {error}");
    }

    let stats = &result.stats;
    let unit = stats.unit.as_deref().map(display_label).unwrap_or("");
    let rows = [
        ("mean", stats.mean),
        ("stdev", stats.stdev),
        ("p05", stats.p05),
        ("p50", stats.p50),
        ("p95", stats.p95),
    ];
    for (label, value) in rows {
        let _ = writeln!(out, "{label:>6}: {} {unit}", format_optional(value));
    }

    let peak = result.histogram.iter().map(|b| b.count).max().unwrap_or(0);
    if peak > 0 {
        let _ = writeln!(out, "histogram ({} samples):", result.sample_count());
        for bin in &result.histogram {
            let width = bin.count * HISTOGRAM_WIDTH / peak;
            let _ = writeln!(
                out,
                "{:>12} .. {:<12} {:>6} {}",
                format_number(bin.x0),
                format_number(bin.x1),
                bin.count,
                "#".repeat(width)
            );
        }
    }
    out.push_str(&render_warnings(&result.warnings));
    out
}

pub fn render_report(report: &Report) -> String {
    let mut out = render_session(&report.session);
    out.push_str("\n== Evaluation ==\n");
    out.push_str(&render_evaluate(&report.evaluation));
    out.push_str("\n== Sweep ==\n");
    out.push_str(&render_sweep(&report.sweep));
    out.push_str("\n== Monte Carlo ==\n");
    out.push_str(&render_monte_carlo(&report.monte_carlo));
    out
}

pub fn render_saved_list(list: &[SavedSession]) -> String {
    if list.is_empty() {
        return "no saved sessions\n".to_string();
    }
    let mut out = String::new();
    for saved in list {
        let _ = writeln!(
            out,
            "{}  {}  {}",
            saved.id,
            saved.updated_at.strftime("%Y-%m-%d %H:%M"),
            saved.title
        );
    }
    out
}
