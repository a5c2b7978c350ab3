//! f16 attention microkernels that don't care how wide your vectors are.
//!
//! Scalable vector extensions (SVE and friends) only tell you the register
//! width at runtime, anywhere from 128 to 2048 bits. This crate keeps the two
//! hot attention products (query·key and weights·value) fast at any of those
//! widths: lane counts come from [`VectorCapability`], every partial register
//! runs under a [`Predicate`], and accumulators are re-split when the width
//! doesn't divide the tile.
//!
//! ## Usage
//!
//! ```
//! use half::f16;
//! use sve_attn::{AttentionProduct, multiply_f16};
//!
//! // 4 query rows against a 32-key panel, head size 128.
//! let q = vec![f16::ONE; 4 * 128];
//! let k = vec![f16::ONE; 32 * 128];
//! let mut scores = vec![f16::ZERO; 4 * 32];
//!
//! multiply_f16(AttentionProduct::QueryKey, &q, &k, &mut scores, 4, 32, 128, false);
//! assert!(scores.iter().all(|s| s.to_f32() == 128.0));
//! ```
//!
//! To pin the width instead of detecting it, build a capability yourself:
//!
//! ```
//! use half::f16;
//! use sve_attn::{VectorCapability, sweep::wv_sweep::wv_sweep};
//!
//! let cap = VectorCapability::with_register_bits(384).unwrap();
//! let p = vec![f16::ONE; 2 * 32];
//! let v = vec![f16::ONE; 32 * 128];
//! let mut out = vec![f16::ZERO; 2 * 128];
//!
//! wv_sweep(cap, &p, &v, &mut out, 2, 128, 32, 32, 128, 128, false);
//! assert!(out.iter().all(|x| x.to_f32() == 32.0));
//! ```
//!
//! ## What's inside
//!
//! - Runtime lane counts and predicate masks (`vector`)
//! - f16 <-> f32 conversion with a scalar tail, plus F16C on x86_64 (`convert`)
//! - Width-agnostic reference GEMM (`matrix::reference`)
//! - 1×128×32 QK and 1×32×128 WV microkernels (`kernels`) and their row sweeps (`sweep`)

pub mod convert;
pub mod dispatch;
pub mod error;
pub mod kernels;
pub mod matrix;
pub mod sweep;
pub mod vector;

use half::f16;

pub use convert::{convert_f16_to_f32, convert_f32_to_f16, cvt_f16_to_f32, cvt_f32_to_f16};
pub use dispatch::{AttentionProduct, TileKernel};
pub use error::KernelError;
pub use kernels::kernel_qk_1x128x32::kernel_qk_1x128x32;
pub use kernels::kernel_wv_1x32x128::kernel_wv_1x32x128;
pub use matrix::reference::gemm_ref_f16;
pub use sweep::qk_sweep::qk_sweep;
pub use sweep::wv_sweep::wv_sweep;
pub use vector::{ElementWidth, Predicate, VectorCapability};

/// Attention product on contiguous tiles: `C (+)= A × B`.
///
/// Picks the fixed-shape kernel when the geometry matches (QK: n=32, k=128;
/// WV: n=128, k=32) and the reference GEMM otherwise, at the detected vector
/// width. A is m×k, C is m×n; B is n×k for [`AttentionProduct::QueryKey`]
/// and k×n for [`AttentionProduct::WeightedValue`].
///
/// # Panics
///
/// Panics if the slice sizes don't match m, n, k.
#[allow(clippy::too_many_arguments)]
pub fn multiply_f16(
    product: AttentionProduct,
    a: &[f16],
    b: &[f16],
    c: &mut [f16],
    m: usize,
    n: usize,
    k: usize,
    accumulate: bool,
) -> TileKernel {
    assert_eq!(a.len(), m * k, "A: expected {}x{}={} elements", m, k, m * k);
    assert_eq!(b.len(), k * n, "B: expected {}x{}={} elements", k, n, k * n);
    assert_eq!(c.len(), m * n, "C: expected {}x{}={} elements", m, n, m * n);

    let ldb = match product {
        AttentionProduct::QueryKey => k,
        AttentionProduct::WeightedValue => n,
    };

    dispatch::run(
        VectorCapability::detect(),
        product,
        a,
        b,
        c,
        m,
        n,
        k,
        k,
        ldb,
        n,
        accumulate,
    )
}
