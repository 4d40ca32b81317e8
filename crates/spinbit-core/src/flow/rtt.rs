//! Edge-based RTT estimation
//!
//! Every polarity flip on a square wave marks one round trip of the spin bit.
//! The time between two consecutive flips is one RTT sample. The first
//! datapoint of a signal is only a reference edge and never produces a sample.

use chrono::{DateTime, TimeDelta, Utc};

use super::packet::PacketRecord;
use super::signal::{extract_signals, DataPoint};

/// One RTT measurement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RttSample {
    /// Flow the sample belongs to
    pub flow_id: String,
    /// Timestamp of the edge that closed the interval
    pub timestamp: DateTime<Utc>,
    /// Time since the previous edge (negative only on misordered input)
    pub rtt: TimeDelta,
}

impl RttSample {
    /// RTT in milliseconds with microsecond resolution
    pub fn rtt_ms(&self) -> f64 {
        match self.rtt.num_microseconds() {
            Some(us) => us as f64 / 1000.0,
            None => self.rtt.num_milliseconds() as f64,
        }
    }
}

/// Detect polarity flips in `signal` and emit one sample per flip
///
/// An empty signal is expected for idle or one-directional flows; it is
/// reported at info level and yields no samples. Timestamps are not checked
/// for monotonicity.
///
/// # Example
/// ```
/// use chrono::{DateTime, TimeDelta, Utc};
/// use spinbit_core::flow::rtt::estimate_rtts;
/// use spinbit_core::flow::signal::DataPoint;
///
/// let t = |ms| DateTime::<Utc>::from_timestamp_millis(ms).unwrap();
/// let signal = [
///     DataPoint::new(t(0), false),
///     DataPoint::new(t(5), true),
///     DataPoint::new(t(12), false),
/// ];
/// let rtts = estimate_rtts("flow-a", &signal);
/// assert_eq!(rtts.len(), 2);
/// assert_eq!(rtts[1].rtt, TimeDelta::milliseconds(7));
/// ```
pub fn estimate_rtts(flow_id: &str, signal: &[DataPoint]) -> Vec<RttSample> {
    let Some((first, rest)) = signal.split_first() else {
        tracing::info!(flow = %flow_id, "empty_signal");
        return Vec::new();
    };

    let mut last_edge = first;
    let mut rtts = Vec::new();
    for datapoint in rest {
        if datapoint.spin_bit != last_edge.spin_bit {
            rtts.push(RttSample {
                flow_id: flow_id.to_string(),
                timestamp: datapoint.timestamp,
                rtt: datapoint.timestamp - last_edge.timestamp,
            });
            last_edge = datapoint;
        }
    }

    tracing::debug!(
        flow = %flow_id,
        datapoints = signal.len(),
        edges = rtts.len(),
        "signal_estimated"
    );
    rtts
}

/// Extract both signals of a flow and estimate RTTs on each
///
/// Upstream samples come first, followed by downstream samples.
pub fn estimate_rtts_for_flow(flow_id: &str, packets: &[PacketRecord]) -> Vec<RttSample> {
    let (upstream, downstream) = extract_signals(packets);
    let mut rtts = estimate_rtts(flow_id, &upstream);
    rtts.extend(estimate_rtts(flow_id, &downstream));
    rtts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::packet::Direction;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    fn ts(ms: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(ms).unwrap()
    }

    fn wave(points: &[(i64, bool)]) -> Vec<DataPoint> {
        points
            .iter()
            .map(|&(ms, bit)| DataPoint::new(ts(ms), bit))
            .collect()
    }

    /// Counts info-level events
    struct InfoCounter(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for InfoCounter {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == tracing::Level::INFO {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[test]
    fn test_empty_signal_emits_diagnostic() {
        let count = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(InfoCounter(Arc::clone(&count)));

        let rtts = tracing::subscriber::with_default(subscriber, || estimate_rtts("idle", &[]));

        assert!(rtts.is_empty());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_single_point_has_no_edges() {
        assert!(estimate_rtts("f", &wave(&[(0, true)])).is_empty());
    }

    #[test]
    fn test_two_edges() {
        let rtts = estimate_rtts("f", &wave(&[(0, false), (5, true), (12, false)]));

        assert_eq!(rtts.len(), 2);
        assert_eq!(rtts[0].timestamp, ts(5));
        assert_eq!(rtts[0].rtt, TimeDelta::milliseconds(5));
        assert_eq!(rtts[1].timestamp, ts(12));
        assert_eq!(rtts[1].rtt, TimeDelta::milliseconds(7));
        assert!(rtts.iter().all(|r| r.flow_id == "f"));
    }

    #[test]
    fn test_plateaus_are_skipped() {
        let signal = wave(&[
            (0, false),
            (3, false),
            (8, true),
            (9, true),
            (11, true),
            (20, false),
        ]);
        let rtts = estimate_rtts("f", &signal);

        let durations: Vec<i64> = rtts.iter().map(|r| r.rtt.num_milliseconds()).collect();
        assert_eq!(durations, vec![8, 12]);
    }

    #[test]
    fn test_edge_count_matches_transitions() {
        let bits = [true, true, false, true, true, true, false, false, true];
        let signal: Vec<DataPoint> = bits
            .iter()
            .enumerate()
            .map(|(i, &b)| DataPoint::new(ts(i as i64 * 10), b))
            .collect();
        let transitions = bits.windows(2).filter(|w| w[0] != w[1]).count();

        assert_eq!(estimate_rtts("f", &signal).len(), transitions);
    }

    #[test]
    fn test_ordered_input_gives_non_negative_rtts() {
        let signal = wave(&[(0, false), (0, true), (4, false), (4, true), (9, false)]);
        let rtts = estimate_rtts("f", &signal);
        assert_eq!(rtts.len(), 4);
        assert!(rtts.iter().all(|r| r.rtt >= TimeDelta::zero()));
    }

    #[test]
    fn test_misordered_input_passes_negative_rtt_through() {
        let rtts = estimate_rtts("f", &wave(&[(10, false), (4, true)]));
        assert_eq!(rtts[0].rtt, TimeDelta::milliseconds(-6));
    }

    #[test]
    fn test_rtt_ms_resolution() {
        let sample = RttSample {
            flow_id: "f".into(),
            timestamp: ts(0),
            rtt: TimeDelta::microseconds(12_345),
        };
        approx::assert_relative_eq!(sample.rtt_ms(), 12.345);
    }

    #[test]
    fn test_flow_concatenates_both_directions() {
        let packets: Vec<PacketRecord> = (0..6)
            .map(|i| {
                let direction = if i % 2 == 0 {
                    Direction::Upstream
                } else {
                    Direction::Downstream
                };
                PacketRecord::new(ts(i as i64 * 10), (i / 2 + 1) as u64, direction, false)
            })
            .collect();

        let rtts = estimate_rtts_for_flow("flow", &packets);

        // up: (0,f) (20,t) (40,f); down: (10,f) (30,t) (50,f)
        let stamps: Vec<i64> = rtts.iter().map(|r| r.timestamp.timestamp_millis()).collect();
        assert_eq!(stamps, vec![20, 40, 30, 50]);
        assert!(rtts.iter().all(|r| r.rtt == TimeDelta::milliseconds(20)));
    }

    #[test]
    fn test_flow_with_no_packets() {
        assert!(estimate_rtts_for_flow("empty", &[]).is_empty());
    }
}
