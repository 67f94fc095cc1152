//! Criterion benchmarks for log extraction, aggregation, and summarisation.
//!
//! Runs the per-run hot path over a synthetic log shaped like a VIO run: seven
//! fixed-label stages per frame plus a handful of captured-label KLT entries.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use xrt_common::RunId;
use xrt_config::PipelineConfig;
use xrt_core::collect::EventMatcher;
use xrt_core::stats::{share_table, summarize_run};
use xrt_core::StageAggregator;

const STAGES: [&str; 7] = [
    "tracking",
    "propagation",
    "MSCKF update",
    "SLAM update",
    "SLAM delayed init",
    "marginalization",
    "total",
];

fn synthetic_log(frames: usize) -> String {
    let mut log = String::with_capacity(frames * 400);
    for i in 0..frames {
        let x = (i as u64).wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        for (s, stage) in STAGES.iter().enumerate() {
            let ms = 0.1 + ((x >> s) % 5_000) as f64 / 1_000.0;
            log.push_str(&format!("\x1b[0;32m[TIME]: {ms:.3} ms for {stage}\x1b[0m\n"));
        }
        log.push_str(&format!(
            "[TIME-KLT]: {:.3} ms for detect new ({} features)\n",
            (x % 900) as f64 / 1_000.0,
            x % 200
        ));
        log.push_str("INFO unrelated plugin output\n");
    }
    log
}

fn bench_extract(c: &mut Criterion) {
    let config = PipelineConfig::default();
    let matcher = match EventMatcher::new(&config.patterns) {
        Ok(m) => m,
        Err(e) => panic!("default patterns must compile: {e}"),
    };

    let mut group = c.benchmark_group("aggregate_stats/extract");
    for frames in [1_000usize, 10_000usize] {
        let log = synthetic_log(frames);
        group.throughput(Throughput::Bytes(log.len() as u64));
        group.bench_with_input(BenchmarkId::new("match_lines", frames), &log, |b, log| {
            b.iter(|| black_box(matcher.events(black_box(log)).count()));
        });
    }
    group.finish();
}

fn bench_aggregate_and_summarize(c: &mut Criterion) {
    let config = PipelineConfig::default();
    let matcher = match EventMatcher::new(&config.patterns) {
        Ok(m) => m,
        Err(e) => panic!("default patterns must compile: {e}"),
    };
    let aggregator = StageAggregator::new(config.admission_threshold);
    let run = RunId::from("bench");

    let mut group = c.benchmark_group("aggregate_stats/pipeline");
    for frames in [1_000usize, 10_000usize] {
        let events: Vec<_> = matcher.events(&synthetic_log(frames)).collect();
        group.throughput(Throughput::Elements(events.len() as u64));
        group.bench_with_input(BenchmarkId::new("aggregate", frames), &events, |b, events| {
            b.iter(|| black_box(aggregator.aggregate(&run, black_box(events.clone()))));
        });

        let aggregation = aggregator.aggregate(&run, events);
        group.bench_with_input(
            BenchmarkId::new("summarize", frames),
            &aggregation,
            |b, agg| {
                b.iter(|| {
                    let stats = summarize_run(agg.series.values());
                    let shares = share_table(&run, agg.series.values()).ok();
                    black_box((stats.len(), shares.map(|s| s.len())));
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_extract, bench_aggregate_and_summarize);
criterion_main!(benches);
