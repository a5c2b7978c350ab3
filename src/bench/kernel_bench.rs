//! Criterion benchmarks: reference GEMM vs. the fixed-shape sweeps, and the
//! converter, at a few register widths.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use half::f16;
use sve_attn::VectorCapability;
use sve_attn::convert::{convert_f32_to_f16, cvt_f32_to_f16};
use sve_attn::matrix::reference::gemm_ref_f16;
use sve_attn::sweep::qk_sweep::qk_sweep;
use sve_attn::sweep::wv_sweep::wv_sweep;

const ROWS: usize = 64;
const HEAD: usize = 128;
const KEYS: usize = 32;
const WIDTHS: [usize; 3] = [128, 256, 512];

fn sample(len: usize, modulus: usize) -> Vec<f16> {
    (0..len)
        .map(|i| f16::from_f32((i % modulus) as f32 / modulus as f32 - 0.5))
        .collect()
}

fn bench_attention(c: &mut Criterion) {
    let q = sample(ROWS * HEAD, 97);
    let keys = sample(KEYS * HEAD, 31);
    let p = sample(ROWS * KEYS, 13);
    let values = sample(KEYS * HEAD, 41);

    let mut group = c.benchmark_group("attention");
    group.throughput(Throughput::Elements((2 * ROWS * KEYS * HEAD) as u64));

    for bits in WIDTHS {
        let cap = VectorCapability::with_register_bits(bits).unwrap();

        group.bench_with_input(BenchmarkId::new("qk_reference", bits), &cap, |bencher, &cap| {
            let mut out = vec![f16::ZERO; ROWS * KEYS];
            bencher.iter(|| {
                gemm_ref_f16(cap, black_box(&q), black_box(&keys), &mut out, ROWS, KEYS, HEAD, HEAD, HEAD, KEYS, false)
            });
        });

        group.bench_with_input(BenchmarkId::new("qk_sweep", bits), &cap, |bencher, &cap| {
            let mut out = vec![f16::ZERO; ROWS * KEYS];
            bencher.iter(|| {
                qk_sweep(cap, black_box(&q), black_box(&keys), &mut out, ROWS, KEYS, HEAD, HEAD, HEAD, KEYS)
            });
        });

        group.bench_with_input(BenchmarkId::new("wv_sweep", bits), &cap, |bencher, &cap| {
            let mut out = vec![f16::ZERO; ROWS * HEAD];
            bencher.iter(|| {
                wv_sweep(cap, black_box(&p), black_box(&values), &mut out, ROWS, HEAD, KEYS, KEYS, HEAD, HEAD, true)
            });
        });
    }
    group.finish();
}

fn bench_convert(c: &mut Criterion) {
    let n = 4096 + 5;
    let src: Vec<f32> = (0..n).map(|i| i as f32 * 0.01 - 20.0).collect();
    let mut dst = vec![f16::ZERO; n];

    let mut group = c.benchmark_group("f32_to_f16");
    group.throughput(Throughput::Elements(n as u64));
    for bits in WIDTHS {
        let cap = VectorCapability::with_register_bits(bits).unwrap();
        group.bench_with_input(BenchmarkId::new("portable", bits), &cap, |bencher, &cap| {
            bencher.iter(|| cvt_f32_to_f16(cap, black_box(&src), &mut dst));
        });
    }
    group.bench_function("dispatched", |bencher| {
        bencher.iter(|| convert_f32_to_f16(black_box(&src), &mut dst));
    });
    group.finish();
}

criterion_group!(benches, bench_attention, bench_convert);
criterion_main!(benches);
