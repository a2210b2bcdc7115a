//! Deck serialization.

use serde::Serialize;

use crate::error::Result;
use crate::model::Deck;
use crate::pipeline::RunReport;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed, human readable.
    #[default]
    Pretty,
    /// Compact, single line.
    Compact,
}

/// Serialize the composed deck to JSON.
pub fn to_json(deck: &Deck, format: JsonFormat) -> Result<String> {
    serialize(deck, format)
}

/// Serialize a run report to JSON.
pub fn report_to_json(report: &RunReport, format: JsonFormat) -> Result<String> {
    serialize(report, format)
}

fn serialize<T: Serialize>(value: &T, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value)?,
        JsonFormat::Compact => serde_json::to_string(value)?,
    };
    Ok(json)
}
