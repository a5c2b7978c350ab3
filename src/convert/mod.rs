//! Bulk f16 <-> f32 conversion.
//!
//! The portable path works at any register width: each chunk is half a
//! register of f16 lanes, widened through a zip with a zero scratch register
//! so every value lands in the low half of a 32-bit container. Whatever is
//! left after the last full chunk goes through a scalar tail. Both directions
//! round to nearest-even, so the vector loop and the tail agree bit for bit.
//!
//! [`convert_f16_to_f32`] and [`convert_f32_to_f16`] pick the F16C path on
//! x86_64 when the CPU has it.

#[cfg(target_arch = "x86_64")]
pub mod f16c;

use half::f16;

use crate::vector::{Predicate, Register, VectorCapability};

/// Widen `src` into `dst[..src.len()]`.
///
/// # Panics
///
/// Panics if `dst` is shorter than `src`.
pub fn cvt_f16_to_f32(cap: VectorCapability, src: &[f16], dst: &mut [f32]) {
    let n = src.len();
    assert!(dst.len() >= n, "dst: expected at least {} elements, got {}", n, dst.len());

    let lanes16 = cap.lanes_of::<f16>();
    let chunk = lanes16 / 2;
    let pg_src = Predicate::while_lt(lanes16 / 2, lanes16, lanes16);
    let pg_dst = cap.ptrue_of::<f32>();
    let scratch = Register::<f16>::zero();

    let mut i = 0;
    while i + chunk <= n {
        let loaded = Register::load(&pg_src, &src[i..]);
        let interleaved = loaded.zip1(&scratch, lanes16);
        let widened = interleaved.widen_even(&pg_dst);
        widened.store(&pg_dst, &mut dst[i..]);
        i += chunk;
    }

    for j in i..n {
        dst[j] = src[j].to_f32();
    }
}

/// Narrow `src` into `dst[..src.len()]`, rounding to nearest-even.
///
/// # Panics
///
/// Panics if `dst` is shorter than `src`.
pub fn cvt_f32_to_f16(cap: VectorCapability, src: &[f32], dst: &mut [f16]) {
    let n = src.len();
    assert!(dst.len() >= n, "dst: expected at least {} elements, got {}", n, dst.len());

    let lanes16 = cap.lanes_of::<f16>();
    let chunk = cap.lanes_of::<f32>();
    let pg_src = cap.ptrue_of::<f32>();
    let pg_dst = Predicate::while_lt(lanes16 / 2, lanes16, lanes16);
    let scratch = Register::<f16>::zero();

    let mut i = 0;
    while i + chunk <= n {
        let loaded = Register::load(&pg_src, &src[i..]);
        let narrowed = loaded.narrow_even(&pg_src);
        let packed = narrowed.uzp1(&scratch, lanes16);
        packed.store(&pg_dst, &mut dst[i..]);
        i += chunk;
    }

    for j in i..n {
        dst[j] = f16::from_f32(src[j]);
    }
}

/// Widen `src` into `dst`, using F16C when available.
pub fn convert_f16_to_f32(src: &[f16], dst: &mut [f32]) {
    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("f16c") && is_x86_feature_detected!("avx") {
            unsafe { f16c::cvt_f16_to_f32_f16c(src, dst) };
            return;
        }
    }

    cvt_f16_to_f32(VectorCapability::detect(), src, dst);
}

/// Narrow `src` into `dst`, using F16C when available.
pub fn convert_f32_to_f16(src: &[f32], dst: &mut [f16]) {
    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("f16c") && is_x86_feature_detected!("avx") {
            unsafe { f16c::cvt_f32_to_f16_f16c(src, dst) };
            return;
        }
    }

    cvt_f32_to_f16(VectorCapability::detect(), src, dst);
}
