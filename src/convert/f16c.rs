//! x86_64 F16C conversion, eight lanes per instruction.

use half::f16;

/// Widen `src` into `dst[..src.len()]` with `vcvtph2ps`.
///
/// # Safety
///
/// Caller must ensure the CPU supports AVX and F16C (checked via
/// `#[target_feature]`).
///
/// # Panics
///
/// Panics if `dst` is shorter than `src`.
#[target_feature(enable = "avx,f16c")]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn cvt_f16_to_f32_f16c(src: &[f16], dst: &mut [f32]) {
    use std::arch::x86_64::*;

    let n = src.len();
    assert!(dst.len() >= n, "dst: expected at least {} elements, got {}", n, dst.len());

    let mut i = 0;
    while i + 8 <= n {
        let h = _mm_loadu_si128(src.as_ptr().add(i) as *const __m128i);
        _mm256_storeu_ps(dst.as_mut_ptr().add(i), _mm256_cvtph_ps(h));
        i += 8;
    }

    for j in i..n {
        dst[j] = src[j].to_f32();
    }
}

/// Narrow `src` into `dst[..src.len()]` with `vcvtps2ph`, round to
/// nearest-even.
///
/// # Safety
///
/// Caller must ensure the CPU supports AVX and F16C (checked via
/// `#[target_feature]`).
///
/// # Panics
///
/// Panics if `dst` is shorter than `src`.
#[target_feature(enable = "avx,f16c")]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn cvt_f32_to_f16_f16c(src: &[f32], dst: &mut [f16]) {
    use std::arch::x86_64::*;

    let n = src.len();
    assert!(dst.len() >= n, "dst: expected at least {} elements, got {}", n, dst.len());

    let mut i = 0;
    while i + 8 <= n {
        let v = _mm256_loadu_ps(src.as_ptr().add(i));
        let h = _mm256_cvtps_ph::<_MM_FROUND_TO_NEAREST_INT>(v);
        _mm_storeu_si128(dst.as_mut_ptr().add(i) as *mut __m128i, h);
        i += 8;
    }

    for j in i..n {
        dst[j] = f16::from_f32(src[j]);
    }
}
