//! Spinbit Core - spin-bit square waves and RTT estimation
//!
//! This library measures round-trip time passively from captured flows. It
//! rebuilds the upstream and downstream spin-bit square waves of each flow
//! and times the edges between polarity flips.

pub mod flow;
pub mod records;
pub mod stats;

pub use flow::packet::{Direction, PacketRecord, TcpFlags};
pub use flow::rtt::{estimate_rtts, estimate_rtts_for_flow, RttSample};
pub use flow::signal::{extract_signals, DataPoint, SignalExtractor};
pub use flow::table::FlowTable;
pub use records::RecordsError;
pub use stats::store::RttStatsStore;

/// Library version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Date the library was built
pub const BUILD_DATE: &str = env!("BUILD_DATE");
