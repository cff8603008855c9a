// src/cli/progress.rs — Terminal progress renderer for comparison runs

use crate::core::events::RunEvent;

/// Build a progress callback that writes formatted output to stderr.
///
/// All progress output goes to stderr so stdout stays clean for the report
/// and JSON output. Returns a closure suitable for `ComparisonRunner::with_progress()`.
pub fn terminal_progress() -> impl Fn(RunEvent) + Send + Sync + 'static {
    move |event| eprintln!("{}", format_event(&event))
}

/// One line per event.
pub fn format_event(event: &RunEvent) -> String {
    match event {
        RunEvent::StrategyStarted {
            strategy,
            index,
            total,
        } => format!(
            "[{}/{}] {} ({}) generating...",
            index + 1,
            total,
            strategy.id(),
            strategy.label()
        ),
        RunEvent::AgentStepCompleted { role, step, .. } => {
            format!("  [agent {}/4] {} done", step, role.title())
        }
        RunEvent::PlacesExtracted { count, .. } => {
            format!("  [extract] {} place(s)", count)
        }
        RunEvent::PlaceGeocoded { name, found } => {
            let mark = if *found { "ok" } else { "miss" };
            format!("  [geo] {:<4} {}", mark, name)
        }
        RunEvent::StrategyFinished {
            strategy,
            elapsed_secs,
            points,
        } => format!(
            "[done] {} in {:.2}s, {} GPS point(s)",
            strategy.id(),
            elapsed_secs,
            points
        ),
        RunEvent::StrategyFailed { strategy, error } => {
            format!("[fail] {}: {}", strategy.id(), error)
        }
        RunEvent::Cooldown {
            secs,
            after_failure,
        } => {
            if *after_failure {
                format!("[wait] {}s after failure", secs)
            } else {
                format!("[wait] {}s cooldown", secs)
            }
        }
        RunEvent::JudgeScored { strategy, score } => {
            format!("[judge] {} scored {:.1}/10", strategy.id(), score)
        }
    }
}
