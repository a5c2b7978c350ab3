//! Query·key sweep: `m` rows of the 1×128×32 kernel.

use half::f16;

use crate::kernels::kernel_qk_1x128x32::QkPlan;
use crate::vector::VectorCapability;

/// `C[i, 0..32] = A[i, 0..128] × B[0..32, 0..128]ᵀ` for every row `i < m`.
///
/// # Arguments
///
/// * `a` - query rows (m × 128), leading dimension `lda`
/// * `b` - key panel (32 × 128), leading dimension `ldb`, shared by every row
/// * `c` - scores (m × 32), leading dimension `ldc`; overwritten
/// * `_n`, `_k` - must be 32 and 128; the geometry is fixed, so they are not read
///
/// # Panics
///
/// Panics if a slice is shorter than the shape and strides require.
#[allow(clippy::too_many_arguments)]
pub fn qk_sweep(
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
) {
    let plan = QkPlan::new(cap);
    for i in 0..m {
        plan.run(&a[i * lda..], b, ldb, &mut c[i * ldc..]);
    }
}
