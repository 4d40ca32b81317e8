//! Spin-bit square wave reconstruction
//!
//! Rebuilds the two one-bit signals of a flow from its packet records. Each
//! endpoint is tracked with a [`HostState`]; a packet only contributes a
//! datapoint when its progress value is strictly above the peer's high-water
//! mark, so retransmissions and reordered packets never add edges.
//!
//! ```text
//! upstream packet:   progress > server.highest  => up   += (ts, client.bit)
//!                                                  server.bit = client.bit
//! downstream packet: progress > client.highest  => down += (ts, server.bit)
//!                                                  client.bit = !server.bit
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::packet::{Direction, PacketRecord};

/// One observation on a square wave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataPoint {
    /// Capture time of the packet that produced this point
    pub timestamp: DateTime<Utc>,
    /// Signal level at that time
    pub spin_bit: bool,
}

impl DataPoint {
    pub fn new(timestamp: DateTime<Utc>, spin_bit: bool) -> Self {
        Self {
            timestamp,
            spin_bit,
        }
    }
}

/// Per-endpoint state, scoped to a single extraction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostState {
    /// Highest progress value accepted for packets answered by this host
    pub highest_progress_seen: u64,
    /// Last spin bit attributed to this host
    pub last_spin_bit: bool,
}

impl HostState {
    /// Accept `progress` if it is new, returning whether it was
    fn advance(&mut self, progress: u64) -> bool {
        if progress > self.highest_progress_seen {
            self.highest_progress_seen = progress;
            true
        } else {
            false
        }
    }
}

/// Upstream and downstream signals of one flow
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowSignals {
    /// Client to server square wave
    pub upstream: Vec<DataPoint>,
    /// Server to client square wave
    pub downstream: Vec<DataPoint>,
}

impl FlowSignals {
    pub fn into_pair(self) -> (Vec<DataPoint>, Vec<DataPoint>) {
        (self.upstream, self.downstream)
    }
}

/// Incremental square wave builder for one flow
///
/// Feed packets in capture order with [`SignalExtractor::push`]. Once a FIN
/// packet has been seen the extractor is finished and ignores everything
/// that follows.
///
/// # Example
/// ```
/// use chrono::{DateTime, Utc};
/// use spinbit_core::flow::packet::{Direction, PacketRecord};
/// use spinbit_core::flow::signal::SignalExtractor;
///
/// let t0: DateTime<Utc> = "2024-01-01T00:00:00Z".parse().unwrap();
/// let mut extractor = SignalExtractor::new();
/// extractor.push(&PacketRecord::new(t0, 1, Direction::Upstream, false));
/// extractor.push(&PacketRecord::new(t0, 1, Direction::Upstream, false));
///
/// let signals = extractor.finish();
/// assert_eq!(signals.upstream.len(), 1);
/// assert!(signals.downstream.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct SignalExtractor {
    client: HostState,
    server: HostState,
    signals: FlowSignals,
    terminated: bool,
    accepted: usize,
    stale: usize,
}

impl SignalExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process the next packet in capture order
    ///
    /// # Returns
    /// `false` once the flow has terminated and further packets are ignored
    pub fn push(&mut self, packet: &PacketRecord) -> bool {
        if self.terminated {
            return false;
        }
        if packet.is_termination() {
            self.terminated = true;
            tracing::trace!(
                timestamp = %packet.timestamp,
                accepted = self.accepted,
                stale = self.stale,
                "flow_terminated"
            );
            return false;
        }

        let accepted = match packet.direction {
            Direction::Upstream => {
                if self.server.advance(packet.progress_value) {
                    self.signals
                        .upstream
                        .push(DataPoint::new(packet.timestamp, self.client.last_spin_bit));
                    self.server.last_spin_bit = self.client.last_spin_bit;
                    true
                } else {
                    false
                }
            }
            Direction::Downstream => {
                if self.client.advance(packet.progress_value) {
                    self.signals
                        .downstream
                        .push(DataPoint::new(packet.timestamp, self.server.last_spin_bit));
                    self.client.last_spin_bit = !self.server.last_spin_bit;
                    true
                } else {
                    false
                }
            }
        };

        if accepted {
            self.accepted += 1;
        } else {
            self.stale += 1;
            tracing::trace!(
                direction = ?packet.direction,
                progress = packet.progress_value,
                "stale_packet"
            );
        }
        true
    }

    /// True once a termination packet has been processed
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Number of packets that appended a datapoint
    pub fn accepted_count(&self) -> usize {
        self.accepted
    }

    /// Number of packets rejected by the progress gate
    pub fn stale_count(&self) -> usize {
        self.stale
    }

    pub fn client(&self) -> &HostState {
        &self.client
    }

    pub fn server(&self) -> &HostState {
        &self.server
    }

    /// Consume the extractor and return both signals
    pub fn finish(self) -> FlowSignals {
        self.signals
    }
}

/// Reconstruct the upstream and downstream square waves of one flow
///
/// Packets are processed in order until the first FIN packet; nothing after
/// it is looked at. An empty flow yields two empty signals.
pub fn extract_signals(packets: &[PacketRecord]) -> (Vec<DataPoint>, Vec<DataPoint>) {
    let mut extractor = SignalExtractor::new();
    for packet in packets {
        if !extractor.push(packet) {
            break;
        }
    }
    extractor.finish().into_pair()
}
