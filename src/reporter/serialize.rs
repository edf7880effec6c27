use crate::harness::Report;
use crate::time::as_millis;
use serde_derive::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRecord<'a> {
    run: uuid::Uuid,
    name: &'a str,
    base_url: &'a str,
    started_at: String,
    duration_ms: u64,
    aborted: bool,
    passed: usize,
    failed: usize,
    errored: usize,
    total: usize,
    planned: usize,
    checks: Vec<CheckRecord<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckRecord<'a> {
    id: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    description: &'a str,
    outcome: &'static str,
    duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
}

impl<'a> From<&'a Report> for RunRecord<'a> {
    fn from(report: &'a Report) -> Self {
        Self {
            run: report.run(),
            name: report.name(),
            base_url: report.base_url(),
            started_at: report.started_at().to_rfc3339(),
            duration_ms: as_millis(report.duration()),
            aborted: report.aborted(),
            passed: report.passed(),
            failed: report.failed(),
            errored: report.errored(),
            total: report.total(),
            planned: report.planned(),
            checks: report
                .entries()
                .iter()
                .map(|entry| CheckRecord {
                    id: entry.id(),
                    description: entry.description(),
                    outcome: entry.outcome().label(),
                    duration_ms: as_millis(entry.duration()),
                    message: entry.outcome().message(),
                })
                .collect(),
        }
    }
}

pub fn render(report: &Report) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&RunRecord::from(report))
}
