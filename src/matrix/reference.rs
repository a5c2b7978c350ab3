//! Width-agnostic reference GEMM over f16 operands.
//!
//! One output element at a time: a single running f16 accumulator register is
//! swept over the reduction dimension in full-register chunks, then reduced
//! horizontally. Slow, but the reduction order is fixed, so it is the
//! baseline the fixed-shape kernels are checked against and the fallback for
//! every other shape.
//!
//! The reduction stops at the last full chunk: when `k` is not a multiple of
//! the f16 lane count, the trailing `k % lanes` products are not summed.

use half::f16;

use crate::vector::{Lane, Predicate, Register, VectorCapability};

/// The B operand of a product, addressed as element `(j, x)` for output
/// column `j` and reduction index `x`.
#[derive(Debug, Clone, Copy)]
pub struct BOperand<'a> {
    data: &'a [f16],
    col_stride: usize,
    depth_stride: usize,
}

impl<'a> BOperand<'a> {
    /// B stored pre-transposed: row `j` holds the `k` reduction values for
    /// output column `j` (`n × k`, leading dimension `ldb`).
    pub fn transposed(data: &'a [f16], ldb: usize) -> Self {
        Self {
            data,
            col_stride: ldb,
            depth_stride: 1,
        }
    }

    /// B stored reduction-major: row `x` holds the `n` output columns for
    /// reduction index `x` (`k × n`, leading dimension `ldb`).
    pub fn reduction_major(data: &'a [f16], ldb: usize) -> Self {
        Self {
            data,
            col_stride: 1,
            depth_stride: ldb,
        }
    }

    #[inline]
    fn load_depth(&self, pg: &Predicate, j: usize, x: usize) -> Register<f16> {
        let base = &self.data[j * self.col_stride + x * self.depth_stride..];
        if self.depth_stride == 1 {
            Register::load(pg, base)
        } else {
            Register::load_strided(pg, base, self.depth_stride)
        }
    }
}

/// `C[i,j] = (accumulate ? C[i,j] : 0) + sum_x A[i,x] * B[j,x]` with B
/// pre-transposed (`n × k`).
///
/// # Arguments
///
/// * `a` - Matrix A (m × k), row-major, leading dimension `lda`
/// * `b` - Matrix Bᵀ (n × k), row-major, leading dimension `ldb`
/// * `c` - Matrix C (m × n), row-major, leading dimension `ldc`
/// * `accumulate` - add to the existing contents of C instead of overwriting
///
/// # Panics
///
/// Panics if a slice is too short for the given shape and strides.
#[allow(clippy::too_many_arguments)]
pub fn gemm_ref_f16(
    cap: VectorCapability,
    a: &[f16],
    b: &[f16],
    c: &mut [f16],
    m: usize,
    n: usize,
    k: usize,
    lda: usize,
    ldb: usize,
    ldc: usize,
    accumulate: bool,
) {
    gemm_ref_f16_with(
        cap,
        a,
        BOperand::transposed(b, ldb),
        c,
        m,
        n,
        k,
        lda,
        ldc,
        accumulate,
    );
}

/// [`gemm_ref_f16`] over any B layout.
#[allow(clippy::too_many_arguments)]
pub fn gemm_ref_f16_with(
    cap: VectorCapability,
    a: &[f16],
    b: BOperand<'_>,
    c: &mut [f16],
    m: usize,
    n: usize,
    k: usize,
    lda: usize,
    ldc: usize,
    accumulate: bool,
) {
    let lanes = cap.lanes_of::<f16>();
    let pg = cap.ptrue_of::<f16>();

    for i in 0..m {
        let a_row = &a[i * lda..];

        for j in 0..n {
            let mut acc = Register::<f16>::zero();

            let mut x = 0;
            while x + lanes <= k {
                let va = Register::load(&pg, &a_row[x..]);
                let vb = b.load_depth(&pg, j, x);
                acc = acc.fmla(&pg, &va, &vb);
                x += lanes;
            }

            let sum = acc.add_across(&pg);
            let out = &mut c[i * ldc + j];
            *out = if accumulate { Lane::add(*out, sum) } else { sum };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::naive::matmul_naive_abt;

    fn h(v: f32) -> f16 {
        f16::from_f32(v)
    }

    #[test]
    fn test_gemm_ref_small_integers() {
        let cap = VectorCapability::with_register_bits(128).unwrap();
        let (m, n, k) = (3, 5, 16);

        let a: Vec<f16> = (0..m * k).map(|i| h((i % 5) as f32 - 2.0)).collect();
        let b: Vec<f16> = (0..n * k).map(|i| h((i % 3) as f32 - 1.0)).collect();

        let mut c = vec![h(99.0); m * n];
        gemm_ref_f16(cap, &a, &b, &mut c, m, n, k, k, k, n, false);

        let mut expected = vec![0.0f32; m * n];
        matmul_naive_abt(&a, &b, &mut expected, m, n, k, k, k, n);

        for i in 0..m * n {
            assert_eq!(c[i].to_f32(), expected[i], "index {}", i);
        }
    }

    #[test]
    fn test_gemm_ref_accumulate_flag() {
        let cap = VectorCapability::with_register_bits(256).unwrap();
        let (m, n, k) = (2, 3, 32);
        let a = vec![h(1.0); m * k];
        let b = vec![h(0.5); n * k];

        let mut c = vec![h(10.0); m * n];
        gemm_ref_f16(cap, &a, &b, &mut c, m, n, k, k, k, n, true);
        assert!(c.iter().all(|v| *v == h(26.0)));

        gemm_ref_f16(cap, &a, &b, &mut c, m, n, k, k, k, n, false);
        assert!(c.iter().all(|v| *v == h(16.0)));
    }

    #[test]
    fn test_gemm_ref_strides() {
        let cap = VectorCapability::with_register_bits(128).unwrap();
        let (m, n, k) = (2, 2, 8);
        let (lda, ldb, ldc) = (11, 9, 5);

        let a: Vec<f16> = (0..m * lda).map(|i| h((i % 4) as f32)).collect();
        let b: Vec<f16> = (0..n * ldb).map(|i| h((i % 3) as f32)).collect();
        let mut c = vec![h(-7.0); m * ldc];
        gemm_ref_f16(cap, &a, &b, &mut c, m, n, k, lda, ldb, ldc, false);

        let mut expected = vec![0.0f32; m * ldc];
        matmul_naive_abt(&a, &b, &mut expected, m, n, k, lda, ldb, ldc);
        for i in 0..m {
            for j in 0..n {
                assert_eq!(c[i * ldc + j].to_f32(), expected[i * ldc + j]);
            }
            // Padding columns are not part of C.
            for j in n..ldc {
                assert_eq!(c[i * ldc + j], h(-7.0));
            }
        }
    }

    #[test]
    fn test_gemm_ref_drops_partial_chunk() {
        // 8 f16 lanes at 128 bits: k = 12 sums only the first 8 products.
        let cap = VectorCapability::with_register_bits(128).unwrap();
        let k = 12;
        let a = vec![h(1.0); k];
        let b = vec![h(1.0); k];
        let mut c = vec![f16::ZERO; 1];
        gemm_ref_f16(cap, &a, &b, &mut c, 1, 1, k, k, k, 1, false);
        assert_eq!(c[0], h(8.0));

        // k smaller than one register sums nothing.
        gemm_ref_f16(cap, &a, &b, &mut c, 1, 1, 7, k, k, 1, false);
        assert_eq!(c[0], f16::ZERO);
    }

    #[test]
    fn test_reduction_major_operand_matches_transposed() {
        let cap = VectorCapability::with_register_bits(256).unwrap();
        let (m, n, k) = (2, 6, 32);

        let a: Vec<f16> = (0..m * k).map(|i| h((i % 7) as f32 - 3.0)).collect();
        let bt: Vec<f16> = (0..n * k).map(|i| h((i % 5) as f32 - 2.0)).collect();
        let mut b_kn = vec![f16::ZERO; k * n];
        crate::matrix::transpose::transpose_panel(&bt, n, k, k, &mut b_kn, n);

        let mut c_t = vec![f16::ZERO; m * n];
        let mut c_kn = vec![f16::ZERO; m * n];
        gemm_ref_f16(cap, &a, &bt, &mut c_t, m, n, k, k, k, n, false);
        gemm_ref_f16_with(
            cap,
            &a,
            BOperand::reduction_major(&b_kn, n),
            &mut c_kn,
            m,
            n,
            k,
            k,
            n,
            false,
        );

        assert_eq!(c_t, c_kn);
    }
}
