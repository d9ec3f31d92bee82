//! Benchmark for access log parsing and transformation
//! Run: cargo bench -p logship-core --bench parsing

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use logship_core::parser::{AccessLogParser, LogParser, ParserRegistry};
use logship_core::transform;
use std::hint::black_box;

// Sample log lines for benchmarking
const COMBINED_LOG: &str = r#"192.168.1.50 - alice [10/Feb/2026:14:30:45 +0000] "GET /api/users/123 HTTP/1.1" 500 1234 "-" "Mozilla/5.0""#;
const COMMON_LOG: &str = r#"192.168.1.50 - - [10/Feb/2026:14:30:45 +0000] "GET /index.html HTTP/1.1" 200 5120"#;

fn bench_access_parser(c: &mut Criterion) {
    let parser = AccessLogParser::new();

    let mut group = c.benchmark_group("access_parser");

    group.bench_function("combined", |b| {
        b.iter(|| parser.parse(black_box(COMBINED_LOG)))
    });

    group.bench_function("common", |b| {
        b.iter(|| parser.parse(black_box(COMMON_LOG)))
    });

    group.finish();
}

fn bench_parser_registry(c: &mut Criterion) {
    let registry = ParserRegistry::with_defaults();

    c.bench_function("access_via_registry", |b| {
        b.iter(|| registry.parse("access", black_box(COMBINED_LOG)))
    });
}

fn bench_transform(c: &mut Criterion) {
    let parser = AccessLogParser::new();
    let record = parser.parse(COMBINED_LOG).unwrap();

    c.bench_function("transform_single", |b| {
        b.iter(|| transform(black_box(record.clone()), "example.com", Some("web-01")))
    });
}

fn bench_batch_throughput(c: &mut Criterion) {
    let parser = AccessLogParser::new();
    let mut group = c.benchmark_group("parse_and_transform");

    for size in [100, 1_000, 10_000] {
        let lines: Vec<&str> = (0..size)
            .map(|i| if i % 2 == 0 { COMBINED_LOG } else { COMMON_LOG })
            .collect();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &lines, |b, lines| {
            b.iter(|| {
                for line in lines {
                    let record = parser.parse(black_box(line)).unwrap();
                    black_box(transform(record, "example.com", None).unwrap());
                }
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_access_parser,
    bench_parser_registry,
    bench_transform,
    bench_batch_throughput
);
criterion_main!(benches);
