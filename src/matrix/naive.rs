//! Scalar baselines with f32 accumulation.
//!
//! No vectors and no f16 rounding between steps, so these are the ground
//! truth the vector kernels are compared against. C is accumulated into
//! (C += A × B), like a plain triple loop.

use half::f16;

/// `C += A × Bᵀ` with B stored pre-transposed (`n × k`).
///
/// # Arguments
///
/// * `a` - Matrix A (m × k), row-major, leading dimension `lda`
/// * `bt` - Matrix Bᵀ (n × k), row-major, leading dimension `ldb`
/// * `c` - Matrix C (m × n), row-major, leading dimension `ldc`
#[allow(clippy::too_many_arguments)]
pub fn matmul_naive_abt(
    a: &[f16],
    bt: &[f16],
    c: &mut [f32],
    m: usize,
    n: usize,
    k: usize,
    lda: usize,
    ldb: usize,
    ldc: usize,
) {
    for i in 0..m {
        for j in 0..n {
            let mut sum = 0.0f32;
            for p in 0..k {
                sum += a[i * lda + p].to_f32() * bt[j * ldb + p].to_f32();
            }
            c[i * ldc + j] += sum;
        }
    }
}

/// `C += A × B` with B stored reduction-major (`k × n`).
///
/// Uses i-k-j order so the inner loop walks B and C sequentially.
#[allow(clippy::too_many_arguments)]
pub fn matmul_naive_ab(
    a: &[f16],
    b: &[f16],
    c: &mut [f32],
    m: usize,
    n: usize,
    k: usize,
    lda: usize,
    ldb: usize,
    ldc: usize,
) {
    for i in 0..m {
        for p in 0..k {
            let av = a[i * lda + p].to_f32();
            for j in 0..n {
                c[i * ldc + j] += av * b[p * ldb + j].to_f32();
            }
        }
    }
}
