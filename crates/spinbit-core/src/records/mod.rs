//! Packet record input and RTT row output
//!
//! ## Input
//!
//! JSON Lines, one decoded packet per line, tagged with its flow:
//!
//! ```text
//! {"flow":"9f1c..","timestamp":"2024-03-01T12:00:00.001Z","ts_val":1201,"direction":"upstream","flags":16}
//! ```
//!
//! ## Output
//!
//! One row per RTT sample, `flow_hash,timestamp,rtt_ms`, as CSV or JSON Lines.
//! Rows from different flows can be concatenated freely.

pub mod reader;
pub mod writer;

use thiserror::Error;

/// Errors raised while loading packets or writing results
#[derive(Error, Debug)]
pub enum RecordsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read line {line}: {source}")]
    Read {
        line: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid packet record on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize RTT row: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RecordsError>;
