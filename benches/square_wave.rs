use chrono::{DateTime, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use spinbit::{estimate_rtts, estimate_rtts_for_flow, extract_signals, Direction, PacketRecord};

// Alternating client/server exchange with one retransmission every 8 packets
fn synthetic_flow(len: usize) -> Vec<PacketRecord> {
    (0..len)
        .map(|i| {
            let direction = if i % 2 == 0 {
                Direction::Upstream
            } else {
                Direction::Downstream
            };
            let progress = (if i % 8 == 7 { i / 2 } else { i / 2 + 1 }) as u64;
            let ts = DateTime::<Utc>::from_timestamp_micros(i as i64 * 250).unwrap_or_default();
            PacketRecord::new(ts, progress, direction, false)
        })
        .collect()
}

fn bench_extract_signals(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_signals");

    for size in [1_000, 10_000, 100_000].iter() {
        let flow = synthetic_flow(*size);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &flow, |b, flow| {
            b.iter(|| black_box(extract_signals(black_box(flow))));
        });
    }

    group.finish();
}

fn bench_estimate_rtts(c: &mut Criterion) {
    let mut group = c.benchmark_group("estimate_rtts");

    let (upstream, _) = extract_signals(&synthetic_flow(100_000));
    group.throughput(Throughput::Elements(upstream.len() as u64));
    group.bench_function("upstream_signal", |b| {
        b.iter(|| black_box(estimate_rtts("bench", black_box(&upstream))));
    });

    group.finish();
}

fn bench_full_flow(c: &mut Criterion) {
    let flow = synthetic_flow(10_000);
    c.bench_function("estimate_rtts_for_flow_10k", |b| {
        b.iter(|| black_box(estimate_rtts_for_flow("bench", black_box(&flow))));
    });
}

criterion_group!(
    benches,
    bench_extract_signals,
    bench_estimate_rtts,
    bench_full_flow
);
criterion_main!(benches);
