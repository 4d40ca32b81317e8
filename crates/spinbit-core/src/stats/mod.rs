//! RTT statistics
//!
//! Summarizes RTT samples per flow for reporting.

pub mod store;
