//! Benchmarks run in CI.
//!
//! Grounded on `astarpa/benches/benchmark.rs`'s base/fast size ladder (100,
//! 1000, 10000 at a fixed mutation rate), adapted from the teacher's nightly
//! `#[bench]`/`test::Bencher` harness to stable `criterion` (already a
//! dev-dependency) and from `uniform_fixed`'s random-mutation generator to a
//! local equivalent built on `rand` (the teacher's `pa-generate` crate isn't
//! part of this retrieval pack).

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::prelude::*;

use banded_align::options::FreeEndGaps;
use banded_align::scoring::{Affine, MatchMismatch};
use banded_align::{global_alignment, global_alignment_score};

const ALPHABET: &[u8] = b"ACGT";

/// Generates a random sequence of length `n` plus a mutated copy at
/// substitution/indel rate `e`, mirroring the teacher's `uniform_fixed`.
fn uniform_fixed(n: usize, e: f64, rng: &mut impl Rng) -> (Vec<u8>, Vec<u8>) {
    let a: Vec<u8> = (0..n).map(|_| *ALPHABET.choose(rng).unwrap()).collect();
    let mut b = Vec::with_capacity(n);
    for &base in &a {
        let roll: f64 = rng.gen();
        if roll < e / 3.0 {
            b.push(*ALPHABET.choose(rng).unwrap()); // substitution
        } else if roll < 2.0 * e / 3.0 {
            // deletion: drop this base
        } else if roll < e {
            b.push(base);
            b.push(*ALPHABET.choose(rng).unwrap()); // insertion
        } else {
            b.push(base);
        }
    }
    (a, b)
}

fn band_for(n: usize, e: f64) -> i64 {
    ((n as f64 * e).ceil() as i64 * 2).max(8)
}

fn bench_linear_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("linear_score");
    let scoring = MatchMismatch::new(1, -1, -1);
    let mut rng = StdRng::seed_from_u64(0x5EED);
    for &n in &[100usize, 1_000, 10_000] {
        let e = 0.2;
        let (a, b) = uniform_fixed(n, e, &mut rng);
        let band = band_for(n, e);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |bencher, _| {
            bencher.iter(|| {
                global_alignment_score(black_box(&a), black_box(&b), &scoring, FreeEndGaps::default(), -band, band)
                    .unwrap()
            });
        });
    }
    group.finish();
}

fn bench_affine_traceback(c: &mut Criterion) {
    let mut group = c.benchmark_group("affine_traceback");
    let scoring = Affine::new(1, -1, -3, -1);
    let mut rng = StdRng::seed_from_u64(0xC0FFEE);
    for &n in &[100usize, 1_000, 10_000] {
        let e = 0.2;
        let (a, b) = uniform_fixed(n, e, &mut rng);
        let band = band_for(n, e);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |bencher, _| {
            bencher.iter(|| {
                global_alignment(black_box(&a), black_box(&b), &scoring, FreeEndGaps::default(), -band, band)
                    .unwrap()
            });
        });
    }
    group.finish();
}

fn bench_similar_50000(c: &mut Criterion) {
    let mut group = c.benchmark_group("similar_50000");
    group.sample_size(10);
    let scoring = MatchMismatch::new(1, -1, -1);
    let mut rng = StdRng::seed_from_u64(0xA5A5);
    let n = 50_000;
    let e = 0.05;
    let (a, b) = uniform_fixed(n, e, &mut rng);
    let band = band_for(n, e);
    group.bench_function("score", |bencher| {
        bencher.iter(|| {
            global_alignment_score(black_box(&a), black_box(&b), &scoring, FreeEndGaps::default(), -band, band)
                .unwrap()
        });
    });
    group.finish();
}

criterion_group!(benches, bench_linear_score, bench_affine_traceback, bench_similar_50000);
criterion_main!(benches);
