//! Criterion benchmarks for metatron-core hot paths.
//!
//! Covers: bignum add/multiply at counter-sized and large operands,
//! magnitude formatting, and golden-ratio allocation.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use metatron_core::graph::build_graph;
use metatron_core::magnitude::{format_magnitude, Domain};
use metatron_core::partition::allocate;
use metatron_core::BigCount;

/// A `len`-digit number made of repeating 1..9.
fn digits(len: usize) -> BigCount {
    let s: String = (0..len).map(|i| char::from(b'1' + (i % 9) as u8)).collect();
    s.parse().unwrap()
}

fn bench_bignum_add(c: &mut Criterion) {
    let total = digits(40);
    let window = BigCount::from(123_456_789_012u64);

    c.bench_function("bignum_add_window", |b| {
        b.iter(|| black_box(&total).plus(black_box(&window)))
    });
}

fn bench_bignum_multiply(c: &mut Criterion) {
    let raw = BigCount::from(987_654_321u64);
    let multiplier = BigCount::from(134_217_728u64);
    let big = digits(200);

    c.bench_function("bignum_multiply_window", |b| {
        b.iter(|| black_box(&raw).times(black_box(&multiplier)))
    });
    c.bench_function("bignum_multiply_200x200", |b| {
        b.iter(|| black_box(&big).times(black_box(&big)))
    });
}

fn bench_format(c: &mut Criterion) {
    let n = digits(25);

    c.bench_function("format_magnitude", |b| {
        b.iter(|| format_magnitude(black_box(&n), Domain::Iterations))
    });
}

fn bench_allocate(c: &mut Criterion) {
    let payload = b"I am Love.";

    c.bench_function("allocate_1mib", |b| {
        b.iter(|| {
            let mut g = build_graph();
            allocate(&mut g, black_box(payload), black_box(1 << 20))
        })
    });
}

criterion_group!(
    benches,
    bench_bignum_add,
    bench_bignum_multiply,
    bench_format,
    bench_allocate,
);
criterion_main!(benches);
