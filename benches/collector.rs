//! Collector and assembly benchmark suite.
//!
//! Benchmarks URL correlation and HAR serialization at page scale:
//! - Entry counts: 100, 500, 2000
//! - Distinct URLs: every request unique, and heavy duplication
//!
//! Run with: cargo bench --bench collector
//! Results saved to: target/criterion/

use std::hint::black_box;
use std::time::Duration;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use tokio::runtime::Runtime;

use har_capture::browser::{NetworkCollector, PageEvent};
use har_capture::testing::{ScriptedLauncher, request_sent, response_received};
use har_capture::{CaptureConfig, CaptureRequest, HarAssembler, Orchestrator};

// ============================================================================
// Benchmark Parameters
// ============================================================================

const ENTRY_COUNTS: &[usize] = &[100, 500, 2000];

/// Number of distinct URLs in the duplicated workload.
const DUPLICATE_URLS: usize = 8;

// ============================================================================
// Workloads
// ============================================================================

/// All requests first, then all responses in reverse order.
fn workload(count: usize, distinct: usize) -> Vec<PageEvent> {
    let url = |i: usize| format!("https://bench.example/asset/{}", i % distinct);
    let mut events: Vec<PageEvent> = (0..count).map(|i| request_sent(&url(i))).collect();
    events.extend((0..count).rev().map(|i| response_received(&url(i), 200)));
    events
}

fn collect(events: &[PageEvent]) -> NetworkCollector {
    let mut collector = NetworkCollector::new();
    for event in events {
        collector.observe(event);
    }
    collector
}

// ============================================================================
// Benchmark: Correlation
// ============================================================================

fn bench_correlation(c: &mut Criterion) {
    let mut group = c.benchmark_group("correlation");

    for &count in ENTRY_COUNTS {
        let unique = workload(count, count);
        group.bench_with_input(BenchmarkId::new("unique", count), &unique, |b, events| {
            b.iter(|| black_box(collect(events)));
        });

        let duplicated = workload(count, DUPLICATE_URLS);
        group.bench_with_input(
            BenchmarkId::new("duplicated", count),
            &duplicated,
            |b, events| {
                b.iter(|| black_box(collect(events)));
            },
        );
    }

    group.finish();
}

// ============================================================================
// Benchmark: Assembly
// ============================================================================

fn bench_assembly(c: &mut Criterion) {
    let assembler = HarAssembler::new();
    let mut group = c.benchmark_group("assembly");

    for &count in ENTRY_COUNTS {
        let collector = collect(&workload(count, count));
        group.bench_with_input(
            BenchmarkId::new("to_json_pretty", count),
            &collector,
            |b, collector| {
                b.iter(|| {
                    let document = assembler.assemble(collector.entries());
                    black_box(document.to_json_pretty().expect("serialize"))
                });
            },
        );
    }

    group.finish();
}

// ============================================================================
// Benchmark: Scripted Capture
// ============================================================================

fn bench_scripted_capture(c: &mut Criterion) {
    let rt = Runtime::new().expect("runtime");

    let mut group = c.benchmark_group("scripted_capture");
    group.measurement_time(Duration::from_secs(10));

    for &count in ENTRY_COUNTS {
        let mut events = workload(count, count);
        events.push(PageEvent::NetworkIdle);
        let launcher = ScriptedLauncher::new()
            .with_events(events)
            .closing_after_script();
        let orchestrator = Orchestrator::new(
            launcher,
            CaptureConfig::default().with_grace_period(Duration::ZERO),
        );
        let request = CaptureRequest::new("bench.example");

        group.bench_with_input(BenchmarkId::new("capture", count), &count, |b, _| {
            b.to_async(&rt)
                .iter(|| async { black_box(orchestrator.capture(&request).await.expect("capture")) });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_correlation,
    bench_assembly,
    bench_scripted_capture
);
criterion_main!(benches);
