//! Row sweeps over the fixed-geometry microkernels.
//!
//! A sweep resolves the kernel's lane split once, then calls it once per
//! output row, stepping A and C by their leading dimensions. `n` and `k` are
//! accepted for signature parity with the reference GEMM; the kernel
//! geometry is fixed, so `m` rows always means exactly `m` kernel calls.
//!
//! Rows are independent: callers that want parallelism split `m` and run one
//! sweep per disjoint block of C rows.
//!
//! Available sweeps:
//! - `qk_sweep`: rows of `kernel_qk_1x128x32` (n = 32, k = 128)
//! - `wv_sweep`: rows of `kernel_wv_1x32x128` (n = 128, k = 32)

pub mod qk_sweep;
pub mod wv_sweep;
