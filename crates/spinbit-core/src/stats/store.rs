//! Per-flow RTT statistics
//!
//! Aggregates RTT samples into running statistics for each flow and for the
//! whole capture.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::flow::rtt::RttSample;

/// Running statistics over a set of RTT samples
#[derive(Debug, Clone, PartialEq)]
pub struct RunningStats {
    /// Most recent RTT (ms)
    pub last_ms: f64,
    /// Minimum RTT observed (ms)
    pub min_ms: f64,
    /// Maximum RTT observed (ms)
    pub max_ms: f64,
    /// Mean RTT (ms)
    pub avg_ms: f64,
    /// Number of samples
    pub count: u64,
    /// Timestamp of the first sample
    pub first_seen: Option<DateTime<Utc>>,
    /// Timestamp of the latest sample
    pub last_seen: Option<DateTime<Utc>>,
    sum_ms: f64,
}

impl Default for RunningStats {
    fn default() -> Self {
        Self {
            last_ms: 0.0,
            min_ms: f64::MAX,
            max_ms: f64::MIN,
            avg_ms: 0.0,
            count: 0,
            first_seen: None,
            last_seen: None,
            sum_ms: 0.0,
        }
    }
}

impl RunningStats {
    fn record(&mut self, sample: &RttSample) {
        let rtt_ms = sample.rtt_ms();
        self.last_ms = rtt_ms;
        self.min_ms = self.min_ms.min(rtt_ms);
        self.max_ms = self.max_ms.max(rtt_ms);
        self.count += 1;
        self.sum_ms += rtt_ms;
        self.avg_ms = self.sum_ms / self.count as f64;

        if self.first_seen.is_none() {
            self.first_seen = Some(sample.timestamp);
        }
        self.last_seen = Some(sample.timestamp);
    }

    /// True if no samples were recorded
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Statistics store keyed by flow
#[derive(Debug, Default)]
pub struct RttStatsStore {
    /// Flow ids in first-seen order
    order: Vec<String>,
    per_flow: HashMap<String, RunningStats>,
    overall: RunningStats,
}

impl RttStatsStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one RTT sample
    pub fn record(&mut self, sample: &RttSample) {
        if !self.per_flow.contains_key(&sample.flow_id) {
            self.order.push(sample.flow_id.clone());
        }
        self.per_flow
            .entry(sample.flow_id.clone())
            .or_default()
            .record(sample);
        self.overall.record(sample);

        if sample.rtt < chrono::TimeDelta::zero() {
            tracing::warn!(
                flow = %sample.flow_id,
                rtt_ms = sample.rtt_ms(),
                "negative_rtt"
            );
        }
    }

    /// Record every sample in `samples`
    pub fn record_all<'a>(&mut self, samples: impl IntoIterator<Item = &'a RttSample>) {
        for sample in samples {
            self.record(sample);
        }
    }

    /// Statistics for one flow
    pub fn flow_stats(&self, flow_id: &str) -> Option<&RunningStats> {
        self.per_flow.get(flow_id)
    }

    /// Statistics across all flows
    pub fn overall(&self) -> &RunningStats {
        &self.overall
    }

    /// Number of flows with at least one sample
    pub fn flow_count(&self) -> usize {
        self.order.len()
    }

    /// Per-flow statistics in first-seen order
    pub fn summary_rows(&self) -> Vec<(&str, &RunningStats)> {
        self.order
            .iter()
            .filter_map(|id| self.per_flow.get(id).map(|s| (id.as_str(), s)))
            .collect()
    }

    /// Clear all statistics
    pub fn clear(&mut self) {
        self.order.clear();
        self.per_flow.clear();
        self.overall = RunningStats::default();
    }
}
