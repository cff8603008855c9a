// src/cli/report.rs — Comparison report: fixed-width table, verdicts, JSON

use std::fmt::Write;

use crate::core::run::{ComparisonRun, StrategyFailure};
use crate::core::types::ComparisonRecord;

const HEADER: [&str; 8] = [
    "Mode", "Time (s)", "Places", "RAG %", "km", "km/place", "Score", "GPS",
];

/// Table, verdicts and failures as one printable block.
pub fn render_report(run: &ComparisonRun) -> String {
    let records = run.records.as_deref().unwrap_or_default();
    let mut out = String::new();

    let _ = writeln!(
        out,
        "wayfare: {} | {} day(s) | {} | {}",
        run.request.destination,
        run.request.days,
        run.request.profile,
        run.request.group_label()
    );
    let _ = writeln!(out, "  run {}", run.id);
    out.push('\n');

    if records.is_empty() {
        out.push_str("  (no results)\n");
    } else {
        out.push_str(&render_table(records));
        out.push('\n');
        out.push_str(&render_verdicts(records));
    }

    if !run.failures.is_empty() {
        out.push('\n');
        out.push_str(&render_failures(&run.failures));
    }

    out
}

pub fn render_table(records: &[ComparisonRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<20} {:>8} {:>6} {:>6} {:>7} {:>8} {:>5} {:>4}",
        HEADER[0], HEADER[1], HEADER[2], HEADER[3], HEADER[4], HEADER[5], HEADER[6], HEADER[7],
    );
    let _ = writeln!(out, "{}", "-".repeat(71));

    for r in records {
        let rag = r
            .rag_fidelity
            .map(|f| format!("{:.1}", f))
            .unwrap_or_else(|| "-".into());
        let _ = writeln!(
            out,
            "{:<20} {:>8.2} {:>6} {:>6} {:>7.2} {:>8.2} {:>5.1} {:>4}",
            r.label, r.generation_secs, r.places_identified, rag, r.total_km, r.efficiency, r.score,
            r.gps_points,
        );
    }
    out
}

pub fn render_verdicts(records: &[ComparisonRecord]) -> String {
    let mut out = String::new();
    for r in records {
        let _ = writeln!(out, "── {} ({}) ──", r.label, r.strategy.id());
        let _ = writeln!(out, "  Score: {:.1}/10", r.score);
        let _ = writeln!(out, "  {}", r.justification);
        out.push('\n');
    }
    out
}

fn render_failures(failures: &[StrategyFailure]) -> String {
    let mut out = String::from("Failed strategies:\n");
    for f in failures {
        let _ = writeln!(out, "  {} ({}): {}", f.strategy.label(), f.strategy.id(), f.error);
    }
    out
}

/// Records as pretty JSON, for `--json`.
pub fn render_json(records: &[ComparisonRecord]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(records)
}
