use crate::harness::{Outcome, Report};
use std::fmt::Write;

fn glyph(outcome: &Outcome) -> char {
    match outcome {
        Outcome::Passed => '✔',
        Outcome::Failed(_) => '✘',
        Outcome::Errored(_) => '!',
    }
}

pub fn render(report: &Report) -> String {
    let mut out = String::new();
    let width = report
        .entries()
        .iter()
        .map(|entry| entry.id().chars().count())
        .max()
        .unwrap_or(0);

    // Writing into a String cannot fail.
    let _ = writeln!(
        out,
        "{} @ {} (run {}, started {})",
        report.name(),
        report.base_url(),
        report.run(),
        report.started_at().format("%Y-%m-%d %H:%M:%S")
    );
    for entry in report.entries() {
        let detail = entry.outcome().message().unwrap_or(entry.description());
        let line = format!(
            "{} {:<width$} {:>6} ms  {}",
            glyph(entry.outcome()),
            entry.id(),
            entry.duration().as_millis(),
            detail,
            width = width
        );
        let _ = writeln!(out, "{}", line.trim_end());
    }
    if report.aborted() {
        let _ = writeln!(
            out,
            "aborted after {} of {} checks",
            report.total(),
            report.planned()
        );
    } else if report.total() < report.planned() {
        let _ = writeln!(
            out,
            "stopped after {} of {} checks",
            report.total(),
            report.planned()
        );
    }
    let _ = writeln!(
        out,
        "{} checks: {} passed, {} failed, {} errored in {} ms",
        report.total(),
        report.passed(),
        report.failed(),
        report.errored(),
        report.duration().as_millis()
    );
    out
}
