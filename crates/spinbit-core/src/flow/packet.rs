//! Decoded packet records
//!
//! A [`PacketRecord`] is one observation taken by the capturing host. Records
//! arrive already decoded: direction, flags, timestamp and progress value are
//! extracted by the capture layer before they reach the signal extractor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which endpoint sent the packet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Client to server
    #[serde(alias = "up")]
    Upstream,
    /// Server to client
    #[serde(alias = "down")]
    Downstream,
}

/// TCP header flag bits
///
/// Only [`TcpFlags::FIN`] matters to the extractor; the other bits exist so
/// fixtures and capture tooling can describe real packets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TcpFlags(pub u8);

impl TcpFlags {
    pub const FIN: TcpFlags = TcpFlags(0x01);
    pub const SYN: TcpFlags = TcpFlags(0x02);
    pub const RST: TcpFlags = TcpFlags(0x04);
    pub const PSH: TcpFlags = TcpFlags(0x08);
    pub const ACK: TcpFlags = TcpFlags(0x10);
    pub const URG: TcpFlags = TcpFlags(0x20);
    pub const ECE: TcpFlags = TcpFlags(0x40);
    pub const CWR: TcpFlags = TcpFlags(0x80);

    /// No flags set
    pub const fn empty() -> Self {
        TcpFlags(0)
    }

    /// Raw flag byte
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// True if every bit of `other` is set in `self`
    pub const fn contains(self, other: TcpFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Connection termination flag
    pub const fn is_fin_set(self) -> bool {
        self.contains(TcpFlags::FIN)
    }
}

impl std::ops::BitOr for TcpFlags {
    type Output = TcpFlags;

    fn bitor(self, rhs: TcpFlags) -> TcpFlags {
        TcpFlags(self.0 | rhs.0)
    }
}

/// A single decoded packet belonging to one flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketRecord {
    /// Capture time at the observer
    pub timestamp: DateTime<Utc>,
    /// Sender-side progress counter (TCP TSval or packet number)
    #[serde(rename = "ts_val", alias = "progress_value")]
    pub progress_value: u64,
    /// Which side sent the packet
    pub direction: Direction,
    /// Observed spin bit
    #[serde(default)]
    pub spin_bit: bool,
    /// Decoded TCP flags
    #[serde(default)]
    pub flags: TcpFlags,
}

impl PacketRecord {
    /// Build a record with no flags set
    pub fn new(
        timestamp: DateTime<Utc>,
        progress_value: u64,
        direction: Direction,
        spin_bit: bool,
    ) -> Self {
        Self {
            timestamp,
            progress_value,
            direction,
            spin_bit,
            flags: TcpFlags::empty(),
        }
    }

    /// Replace the flag set
    pub fn with_flags(mut self, flags: TcpFlags) -> Self {
        self.flags = flags;
        self
    }

    /// True if this packet terminates the connection
    pub fn is_termination(&self) -> bool {
        self.flags.is_fin_set()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fin_detection() {
        assert!(TcpFlags::FIN.is_fin_set());
        assert!((TcpFlags::FIN | TcpFlags::ACK).is_fin_set());
        assert!(!TcpFlags::ACK.is_fin_set());
        assert!(!TcpFlags::empty().is_fin_set());
    }

    #[test]
    fn test_contains_multiple_bits() {
        let flags = TcpFlags::SYN | TcpFlags::ACK;
        assert!(flags.contains(TcpFlags::SYN));
        assert!(flags.contains(TcpFlags::SYN | TcpFlags::ACK));
        assert!(!flags.contains(TcpFlags::RST));
        assert_eq!(flags.bits(), 0x12);
    }

    #[test]
    fn test_record_deserializes_from_capture_json() {
        let json = r#"{
            "timestamp": "2024-03-01T12:00:00.250Z",
            "ts_val": 42,
            "direction": "downstream",
            "spin_bit": true,
            "flags": 17
        }"#;
        let record: PacketRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.progress_value, 42);
        assert_eq!(record.direction, Direction::Downstream);
        assert!(record.spin_bit);
        assert!(record.is_termination());
        assert_eq!(record.timestamp.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn test_missing_flags_and_spin_default() {
        let json = r#"{"timestamp": "2024-03-01T12:00:00Z", "progress_value": 7, "direction": "up"}"#;
        let record: PacketRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.direction, Direction::Upstream);
        assert_eq!(record.flags, TcpFlags::empty());
        assert!(!record.spin_bit);
        assert!(!record.is_termination());
    }
}
