//! Spinbit - passive RTT estimation from the spin-bit square wave
//!
//! This library re-exports the signal extraction, RTT estimation and
//! statistics functionality from `spinbit-core`, plus the CLI configuration.

pub mod config;

pub use spinbit_core::flow;
pub use spinbit_core::records;
pub use spinbit_core::stats;

pub use spinbit_core::{
    estimate_rtts, estimate_rtts_for_flow, extract_signals, DataPoint, Direction, FlowTable,
    PacketRecord, RecordsError, RttSample, RttStatsStore, SignalExtractor, TcpFlags,
};
pub use spinbit_core::{BUILD_DATE, VERSION};
