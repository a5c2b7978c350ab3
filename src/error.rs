//! Errors for the few fallible, construction-time entry points.
//!
//! Kernels themselves never fail: shapes and strides are caller contracts.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KernelError {
    /// Register widths must be a multiple of 128 bits between 128 and 2048.
    #[error("unsupported vector register width: {bits} bits (expected a multiple of 128 in 128..=2048)")]
    InvalidRegisterWidth { bits: usize },
}
