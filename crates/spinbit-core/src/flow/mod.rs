//! Per-flow spin-bit processing
//!
//! This module contains the latency pipeline for a single flow:
//! - Decoded packet records and TCP flags ([`packet`])
//! - Square wave reconstruction with the progress gate ([`signal`])
//! - Edge detection and RTT samples ([`rtt`])
//! - Grouping of mixed captures into flows ([`table`])

pub mod packet;
pub mod rtt;
pub mod signal;
pub mod table;
