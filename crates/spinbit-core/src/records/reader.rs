//! JSON Lines packet reader

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{RecordsError, Result};
use crate::flow::packet::PacketRecord;
use crate::flow::table::FlowTable;

/// A packet record tagged with its flow identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowPacket {
    /// Flow identifier (connection hash)
    #[serde(alias = "flow_hash")]
    pub flow: String,
    #[serde(flatten)]
    pub record: PacketRecord,
}

/// Parse every packet from a JSON Lines stream
///
/// Blank lines are skipped. The first unreadable or malformed line aborts the
/// read and is reported with its 1-based line number.
pub fn read_packets<R: BufRead>(reader: R) -> Result<Vec<FlowPacket>> {
    let mut packets = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| RecordsError::Read { line: i + 1, source })?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let packet = serde_json::from_str(trimmed)
            .map_err(|source| RecordsError::Parse { line: i + 1, source })?;
        packets.push(packet);
    }
    tracing::debug!(count = packets.len(), "packets_read");
    Ok(packets)
}

/// Read every packet from a file in capture order
pub fn load_packets(path: &Path) -> Result<Vec<FlowPacket>> {
    let file = File::open(path)?;
    read_packets(BufReader::new(file))
}

/// Read a packet file and group it into flows
pub fn load_flows(path: &Path) -> Result<FlowTable> {
    let packets = load_packets(path)?;
    let table = FlowTable::from_records(packets.into_iter().map(|p| (p.flow, p.record)));
    tracing::info!(
        path = %path.display(),
        flows = table.len(),
        packets = table.packet_count(),
        "packets_loaded"
    );
    Ok(table)
}
