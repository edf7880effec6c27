//! Presentation of a finished [`Report`](crate::harness::Report).

pub mod serialize;
pub mod text;

use crate::harness::Report;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Format {
    /// One line per check with a status glyph, then a summary.
    Text,
    /// A single JSON document, one record per check.
    Json,
}

pub fn render(report: &Report, format: Format) -> Result<String, serde_json::Error> {
    match format {
        Format::Text => Ok(text::render(report)),
        Format::Json => serialize::render(report),
    }
}
