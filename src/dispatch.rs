//! Picks the kernel variant for a tile by its geometry.
//!
//! The two fixed-shape sweeps and the reference GEMM all compute the same
//! bounded product; which one runs depends only on the product kind, `n`
//! and `k`. Anything outside the two fixed geometries goes to the reference
//! GEMM.

use half::f16;
use log::trace;

use crate::kernels::kernel_qk_1x128x32::{QK_DEPTH, QK_WIDTH, QkPlan};
use crate::kernels::kernel_wv_1x32x128::{WV_DEPTH, WV_WIDTH};
use crate::matrix::reference::{BOperand, gemm_ref_f16_with};
use crate::sweep::qk_sweep::qk_sweep;
use crate::sweep::wv_sweep::wv_sweep;
use crate::vector::{Lane, VectorCapability};

/// Which attention product a tile belongs to. Fixes how B is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttentionProduct {
    /// Scores `Q × Kᵀ`: B is the key panel, one row per output column (n × k).
    QueryKey,
    /// Context `P × V`: B is the value panel, one row per reduction step (k × n).
    WeightedValue,
}

impl AttentionProduct {
    fn b_operand<'a>(&self, b: &'a [f16], ldb: usize) -> BOperand<'a> {
        match self {
            Self::QueryKey => BOperand::transposed(b, ldb),
            Self::WeightedValue => BOperand::reduction_major(b, ldb),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileKernel {
    /// 1×128×32 rows, see [`crate::kernels::kernel_qk_1x128x32`]. The
    /// kernel always overwrites; accumulating tiles add its row into C.
    QueryKey,
    /// 1×32×128 rows, see [`crate::kernels::kernel_wv_1x32x128`].
    WeightedValue,
    /// [`crate::matrix::reference::gemm_ref_f16`]; drops the `k % lanes` tail.
    Reference,
}

impl TileKernel {
    /// Only the geometry decides; `accumulate` is accepted by every variant.
    pub fn select(product: AttentionProduct, n: usize, k: usize, _accumulate: bool) -> Self {
        match product {
            AttentionProduct::QueryKey if n == QK_WIDTH && k == QK_DEPTH => Self::QueryKey,
            AttentionProduct::WeightedValue if n == WV_WIDTH && k == WV_DEPTH => Self::WeightedValue,
            _ => Self::Reference,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::QueryKey => "qk 1x128x32",
            Self::WeightedValue => "wv 1x32x128",
            Self::Reference => "reference",
        }
    }
}

/// Runs `product` on strided tiles with whichever variant fits, and returns
/// the variant used.
///
/// # Arguments
///
/// * `a` - Matrix A (m × k), leading dimension `lda`
/// * `b` - key panel (n × k) or value panel (k × n), leading dimension `ldb`
/// * `c` - Matrix C (m × n), leading dimension `ldc`
/// * `accumulate` - add to the existing contents of C instead of overwriting
///
/// # Panics
///
/// Panics if a slice is shorter than the shape and strides require.
#[allow(clippy::too_many_arguments)]
pub fn run(
    cap: VectorCapability,
    product: AttentionProduct,
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
) -> TileKernel {
    let kernel = TileKernel::select(product, n, k, accumulate);
    trace!(
        "{:?} m={} n={} k={} accumulate={} -> {}",
        product,
        m,
        n,
        k,
        accumulate,
        kernel.name()
    );

    match kernel {
        TileKernel::QueryKey if accumulate => qk_sweep_accumulate(cap, a, b, c, m, lda, ldb, ldc),
        TileKernel::QueryKey => qk_sweep(cap, a, b, c, m, n, k, lda, ldb, ldc),
        TileKernel::WeightedValue => wv_sweep(cap, a, b, c, m, n, k, lda, ldb, ldc, accumulate),
        TileKernel::Reference => gemm_ref_f16_with(
            cap,
            a,
            product.b_operand(b, ldb),
            c,
            m,
            n,
            k,
            lda,
            ldc,
            accumulate,
        ),
    }
    kernel
}

/// Adds each 1×32 QK row into C. The kernel writes the row into a stack
/// scratch row, then every score is added with one f16 rounding.
#[allow(clippy::too_many_arguments)]
fn qk_sweep_accumulate(
    cap: VectorCapability,
    a: &[f16],
    b: &[f16],
    c: &mut [f16],
    m: usize,
    lda: usize,
    ldb: usize,
    ldc: usize,
) {
    let plan = QkPlan::new(cap);
    let mut row = [f16::ZERO; QK_WIDTH];
    for i in 0..m {
        plan.run(&a[i * lda..], b, ldb, &mut row);
        let out = &mut c[i * ldc..i * ldc + QK_WIDTH];
        for (dst, fresh) in out.iter_mut().zip(row) {
            *dst = Lane::add(*dst, fresh);
        }
    }
}
