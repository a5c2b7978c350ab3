//! Reference GEMM and scalar baselines.
//!
//! These provide correctness baselines and the general fallback used for
//! shapes the fixed-geometry microkernels don't cover.

pub mod naive;
pub mod reference;
pub mod transpose;
