//! RTT row writer

use std::io::Write;

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use super::Result;
use crate::flow::rtt::RttSample;

/// CSV header line
pub const CSV_HEADER: &str = "flow_hash,timestamp,rtt_ms";

/// Output row encoding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" | "jsonl" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format: {}", other)),
        }
    }
}

/// Serializable form of an [`RttSample`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RttRow {
    pub flow_hash: String,
    /// RFC 3339 with microseconds
    pub timestamp: String,
    pub rtt_ms: f64,
}

impl From<&RttSample> for RttRow {
    fn from(sample: &RttSample) -> Self {
        Self {
            flow_hash: sample.flow_id.clone(),
            timestamp: sample
                .timestamp
                .to_rfc3339_opts(SecondsFormat::Micros, true),
            rtt_ms: sample.rtt_ms(),
        }
    }
}

/// Write RTT samples as rows in the given format
///
/// CSV output always starts with [`CSV_HEADER`], even with no samples.
pub fn write_rtts<W: Write>(
    writer: &mut W,
    samples: &[RttSample],
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Csv => {
            writeln!(writer, "{}", CSV_HEADER)?;
            for row in samples.iter().map(RttRow::from) {
                writeln!(
                    writer,
                    "{},{},{:.3}",
                    csv_field(&row.flow_hash),
                    row.timestamp,
                    row.rtt_ms
                )?;
            }
        }
        OutputFormat::Json => {
            for row in samples.iter().map(RttRow::from) {
                serde_json::to_writer(&mut *writer, &row)?;
                writeln!(writer)?;
            }
        }
    }
    writer.flush()?;
    tracing::debug!(rows = samples.len(), format = ?format, "rtts_written");
    Ok(())
}

/// Quote a CSV field if it contains a separator, quote or newline
fn csv_field(value: &str) -> std::borrow::Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\"")).into()
    } else {
        value.into()
    }
}
