//! Performance benchmarks for allowlist validation.
//!
//! Validation runs once per fresh card detection, so it is nowhere near the
//! poll budget; these numbers exist to catch accidental regressions such as
//! allocating per comparison.
//!
//! # Run Benchmarks
//!
//! ```sh
//! # Run all validation benchmarks
//! cargo bench --bench validation_bench
//!
//! # Run specific benchmark group
//! cargo bench --bench validation_bench -- allowlist_size
//! ```

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use fobgate_core::{AllowList, CardUid};
use std::hint::black_box;

fn uid(bytes: &[u8]) -> CardUid {
    CardUid::new(bytes.to_vec()).expect("benchmark UID within bounds")
}

/// Builtin allowlist against accepted, rejected and odd-length UIDs.
fn bench_builtin_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("builtin_validation");
    group.throughput(Throughput::Elements(1));

    let allowlist = AllowList::builtin().expect("builtin allowlist is valid");
    let scenarios = vec![
        ("first_entry", uid(&[0x63, 0xDD, 0x46, 0x1C])),
        ("last_entry", uid(&[0xDD, 0xCE, 0x96, 0x38])),
        ("rejected", uid(&[0x01, 0x02, 0x03, 0x04])),
        ("seven_byte", uid(&[0x04, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66])),
    ];

    for (name, card) in scenarios {
        group.bench_with_input(BenchmarkId::new("validate", name), &card, |b, card| {
            b.iter(|| black_box(allowlist.validate(black_box(card))));
        });
    }

    group.finish();
}

/// Worst case (rejection scans every entry) as the allowlist grows.
fn bench_allowlist_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("allowlist_size");

    for size in [2usize, 16, 128, 1024] {
        group.throughput(Throughput::Elements(size as u64));

        let allowlist = AllowList::from_uids((0..size as u32).map(|i| uid(&i.to_be_bytes())));
        let stranger = uid(&[0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);

        group.bench_with_input(BenchmarkId::new("rejected", size), &stranger, |b, card| {
            b.iter(|| black_box(allowlist.validate(black_box(card))));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_builtin_validation, bench_allowlist_size);

criterion_main!(benches);
