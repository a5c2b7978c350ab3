//! Weighted-value sweep: `m` rows of the 1×32×128 kernel.

use half::f16;

use crate::kernels::kernel_wv_1x32x128::WvPlan;
use crate::vector::VectorCapability;

/// `C[i, 0..128] (+)= A[i, 0..32] × B[0..32, 0..128]` for every row `i < m`.
///
/// # Arguments
///
/// * `a` - attention weights (m × 32), leading dimension `lda`
/// * `b` - value panel (32 × 128), leading dimension `ldb`, shared by every row
/// * `c` - output (m × 128), leading dimension `ldc`
/// * `_n`, `_k` - must be 128 and 32; the geometry is fixed, so they are not read
/// * `accumulate` - add to the existing rows of C instead of overwriting them
///
/// # Panics
///
/// Panics if a slice is shorter than the shape and strides require.
#[allow(clippy::too_many_arguments)]
pub fn wv_sweep(
    cap: VectorCapability,
    a: &[f16],
    b: &[f16],
    c: &mut [f16],
    m: usize,
    _n: usize,
    _k: usize,
    lda: usize,
    ldb: usize,
    ldc: usize,
    accumulate: bool,
) {
    let plan = WvPlan::new(cap);
    for i in 0..m {
        plan.run(&a[i * lda..], b, ldb, &mut c[i * ldc..], accumulate);
    }
}
