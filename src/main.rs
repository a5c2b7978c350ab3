//! Benchmark runner for the attention kernels.

use half::f16;
use sve_attn::VectorCapability;
use sve_attn::matrix::reference::gemm_ref_f16;
use sve_attn::sweep::qk_sweep::qk_sweep;
use sve_attn::sweep::wv_sweep::wv_sweep;
use std::time::Instant;

const HEAD: usize = 128;
const KEYS: usize = 32;

fn main() {
    env_logger::init();

    println!("=== f16 Attention Kernel Benchmark ===\n");

    let detected = VectorCapability::detect();
    println!("Detected vector width: {} bits\n", detected.register_bits());

    let rows = 512;
    let iterations = 5;

    let q: Vec<f16> = (0..rows * HEAD).map(|i| sample(i, 100)).collect();
    let keys: Vec<f16> = (0..KEYS * HEAD).map(|i| sample(i, 37)).collect();
    let p: Vec<f16> = (0..rows * KEYS).map(|i| sample(i, 17)).collect();
    let values: Vec<f16> = (0..KEYS * HEAD).map(|i| sample(i, 53)).collect();

    let mut widths = vec![detected.register_bits()];
    for bits in [128, 256, 384, 512, 2048] {
        if !widths.contains(&bits) {
            widths.push(bits);
        }
    }

    let mut all_results = Vec::new();
    for bits in widths {
        let Ok(cap) = VectorCapability::with_register_bits(bits) else {
            continue;
        };
        println!("Register width: {} bits", bits);
        println!("{}", "-".repeat(50));

        let flops = 2.0 * (rows * KEYS * HEAD) as f64;
        let results = vec![
            (
                "QK reference",
                bench(iterations, flops, rows * KEYS, |c| {
                    gemm_ref_f16(cap, &q, &keys, c, rows, KEYS, HEAD, HEAD, HEAD, KEYS, false)
                }),
            ),
            (
                "QK sweep",
                bench(iterations, flops, rows * KEYS, |c| {
                    qk_sweep(cap, &q, &keys, c, rows, KEYS, HEAD, HEAD, HEAD, KEYS)
                }),
            ),
            (
                "WV sweep",
                bench(iterations, flops, rows * HEAD, |c| {
                    wv_sweep(cap, &p, &values, c, rows, HEAD, KEYS, KEYS, HEAD, HEAD, false)
                }),
            ),
        ];

        let baseline_time = results[0].1.0;
        for (i, (name, (time_ms, gflops))) in results.iter().enumerate() {
            println!(
                "{}. {:14} {:8.2} ms  {:6.2} GFLOPS  ({:.1}×)",
                i + 1,
                name,
                time_ms,
                gflops,
                baseline_time / time_ms
            );
        }
        println!();

        all_results.push((bits, results));
    }

    print_summary_table(&all_results);
}

fn sample(i: usize, modulus: usize) -> f16 {
    f16::from_f32((i % modulus) as f32 / modulus as f32 - 0.5)
}

/// Time `f` writing into a fresh output of `out_len` elements.
fn bench<F>(iterations: usize, flops: f64, out_len: usize, f: F) -> (f64, f64)
where
    F: Fn(&mut [f16]),
{
    // Warmup
    let mut c = vec![f16::ZERO; out_len];
    f(&mut c);

    let mut total = 0.0;
    for _ in 0..iterations {
        let mut c = vec![f16::ZERO; out_len];
        let start = Instant::now();
        f(&mut c);
        total += start.elapsed().as_secs_f64();
    }

    let avg = total / iterations as f64;
    (avg * 1000.0, flops / avg / 1e9)
}

#[allow(clippy::type_complexity)]
fn print_summary_table(all_results: &[(usize, Vec<(&str, (f64, f64))>)]) {
    println!("{}", "=".repeat(60));
    println!("SUMMARY (GFLOPS)");
    println!("{}", "=".repeat(60));

    print!("{:<10}", "Bits");
    for (name, _) in &all_results[0].1 {
        print!(" {:>14}", name);
    }
    println!();
    println!("{}", "-".repeat(60));

    for (bits, results) in all_results {
        print!("{:<10}", bits);
        for (_, (_, gflops)) in results {
            print!(" {:>14.3}", gflops);
        }
        println!();
    }
    println!("{}", "=".repeat(60));
}
