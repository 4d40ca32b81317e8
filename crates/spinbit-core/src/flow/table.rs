//! Grouping of a capture-ordered record stream into flows

use std::collections::HashMap;

use super::packet::PacketRecord;
use super::rtt::{estimate_rtts_for_flow, RttSample};

/// Packet records grouped by flow identifier
///
/// Flows keep the order in which they were first seen, and packets keep
/// capture order within their flow.
#[derive(Debug, Default)]
pub struct FlowTable {
    flows: Vec<(String, Vec<PacketRecord>)>,
    index: HashMap<String, usize>,
}

impl FlowTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(flow_id, record)` pairs in capture order
    pub fn from_records<I, S>(records: I) -> Self
    where
        I: IntoIterator<Item = (S, PacketRecord)>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for (flow_id, record) in records {
            table.push(flow_id, record);
        }
        table
    }

    /// Append a record to its flow, creating the flow if needed
    pub fn push(&mut self, flow_id: impl Into<String>, record: PacketRecord) {
        let flow_id = flow_id.into();
        match self.index.get(&flow_id) {
            Some(&i) => self.flows[i].1.push(record),
            None => {
                self.index.insert(flow_id.clone(), self.flows.len());
                self.flows.push((flow_id, vec![record]));
            }
        }
    }

    /// Packets of one flow
    pub fn packets(&self, flow_id: &str) -> Option<&[PacketRecord]> {
        self.index
            .get(flow_id)
            .map(|&i| self.flows[i].1.as_slice())
    }

    /// Iterate flows in first-seen order
    pub fn flows(&self) -> impl Iterator<Item = (&str, &[PacketRecord])> {
        self.flows
            .iter()
            .map(|(id, packets)| (id.as_str(), packets.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    /// Total packets across all flows
    pub fn packet_count(&self) -> usize {
        self.flows.iter().map(|(_, p)| p.len()).sum()
    }

    /// Run RTT estimation on every flow and concatenate the results
    pub fn estimate_all(&self) -> Vec<RttSample> {
        let mut rtts = Vec::new();
        for (flow_id, packets) in self.flows() {
            let flow_rtts = estimate_rtts_for_flow(flow_id, packets);
            tracing::debug!(
                flow = %flow_id,
                packets = packets.len(),
                samples = flow_rtts.len(),
                "flow_processed"
            );
            rtts.extend(flow_rtts);
        }
        tracing::info!(
            flows = self.len(),
            packets = self.packet_count(),
            samples = rtts.len(),
            "estimation_complete"
        );
        rtts
    }
}
