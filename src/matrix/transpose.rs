//! Panel layout flips between key-style (`n × k`) and value-style (`k × n`).

use half::f16;

/// Copies the `rows × cols` panel at `src` (leading dimension `lds`) into
/// `dst` as its `cols × rows` transpose (leading dimension `ldd`).
///
/// A value panel flipped this way can be fed to the reference GEMM's
/// pre-transposed B path, and a key panel flipped this way reads like a value
/// panel. Padding columns of either buffer are left alone.
///
/// ```
/// use half::f16;
/// use sve_attn::matrix::transpose::transpose_panel;
///
/// // 2 reduction rows of 3 outputs, padded to a stride of 4.
/// let v: Vec<f16> = [1.0, 2.0, 3.0, 0.0,
///                    4.0, 5.0, 6.0, 0.0].map(f16::from_f32).to_vec();
/// let mut vt = vec![f16::ZERO; 6];
///
/// transpose_panel(&v, 2, 3, 4, &mut vt, 2);
///
/// let expected: Vec<f16> = [1.0, 4.0,
///                           2.0, 5.0,
///                           3.0, 6.0].map(f16::from_f32).to_vec();
/// assert_eq!(vt, expected);
/// ```
///
/// # Panics
///
/// Panics if either buffer is shorter than its shape and stride require.
pub fn transpose_panel(
    src: &[f16],
    rows: usize,
    cols: usize,
    lds: usize,
    dst: &mut [f16],
    ldd: usize,
) {
    for (i, row) in src.chunks(lds).take(rows).enumerate() {
        for (j, &v) in row[..cols].iter().enumerate() {
            dst[j * ldd + i] = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transpose_panel_twice_is_identity() {
        let (rows, cols) = (32, 128);
        let src: Vec<f16> = (0..rows * cols)
            .map(|i| f16::from_f32((i % 61) as f32 - 30.0))
            .collect();

        let mut flipped = vec![f16::ZERO; cols * rows];
        let mut back = vec![f16::ZERO; rows * cols];
        transpose_panel(&src, rows, cols, cols, &mut flipped, rows);
        transpose_panel(&flipped, cols, rows, rows, &mut back, cols);

        assert_eq!(flipped[5 * rows + 3], src[3 * cols + 5]);
        assert_eq!(back, src);
    }

    #[test]
    fn test_transpose_panel_keeps_destination_padding() {
        let src: Vec<f16> = (0..6).map(|i| f16::from_f32(i as f32)).collect();
        let sentinel = f16::from_f32(-7.0);
        // 2×3 into a 3×2 panel with a stride of 3.
        let mut dst = vec![sentinel; 9];
        transpose_panel(&src, 2, 3, 3, &mut dst, 3);

        for j in 0..3 {
            assert_eq!(dst[j * 3], src[j]);
            assert_eq!(dst[j * 3 + 1], src[3 + j]);
            assert_eq!(dst[j * 3 + 2], sentinel);
        }
    }
}
