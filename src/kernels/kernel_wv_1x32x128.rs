//! 1×32×128 weighted-value microkernel.

use half::f16;

use super::{BroadcastBlock, MIN_F16_LANES, OutputTiling, STEP_BLOCK};
use crate::vector::{Register, VectorCapability};

/// Reduction depth (values per tile).
pub const WV_DEPTH: usize = 32;

/// Output width (value head size).
pub const WV_WIDTH: usize = 128;

const WV_MAX_ACCUMULATORS: usize = WV_WIDTH / MIN_F16_LANES;

/// Lane split of the 1×128 output for one vector width.
#[derive(Debug, Clone, Copy)]
pub struct WvPlan {
    lanes: usize,
    tiling: OutputTiling<WV_MAX_ACCUMULATORS>,
}

impl WvPlan {
    pub fn new(cap: VectorCapability) -> Self {
        let lanes = cap.lanes_of::<f16>();
        Self {
            lanes,
            tiling: OutputTiling::new(lanes, WV_WIDTH),
        }
    }

    /// Accumulator registers this width needs (8 at 256 bits).
    pub fn accumulators(&self) -> usize {
        self.tiling.count()
    }

    /// Computes `c[j] = (accumulate ? c[j] : 0) + sum_x a[x] * b[x * ldb + j]`
    /// for `j < 128`, `x < 32`.
    ///
    /// The 32-deep reduction runs as two blocks of 16 steps; every step
    /// broadcasts one A lane against one register-wide slice of B row `x`
    /// per accumulator.
    #[inline]
    pub fn run(&self, a: &[f16], b: &[f16], ldb: usize, c: &mut [f16], accumulate: bool) {
        let mut acc = [Register::<f16>::zero(); WV_MAX_ACCUMULATORS];
        if accumulate {
            for t in 0..self.tiling.count() {
                acc[t] = Register::load(self.tiling.predicate(t), &c[self.tiling.offset(t)..]);
            }
        }

        for block in (0..WV_DEPTH).step_by(STEP_BLOCK) {
            let a_block = BroadcastBlock::load(self.lanes, &a[block..]);

            for s in 0..STEP_BLOCK {
                let (a_reg, lane) = a_block.lane(s);
                let b_row = &b[(block + s) * ldb..];

                for t in 0..self.tiling.count() {
                    let pg = self.tiling.predicate(t);
                    let vb = Register::load(pg, &b_row[self.tiling.offset(t)..]);
                    acc[t] = acc[t].fmla_lane(pg, &vb, a_reg, lane);
                }
            }
        }

        for t in 0..self.tiling.count() {
            acc[t].store(self.tiling.predicate(t), &mut c[self.tiling.offset(t)..]);
        }
    }
}

/// Computes one 1×128 row: `C[0, j] (+)= sum_x A[0, x] * B[x, j]`.
///
/// # Arguments
///
/// * `a` - one row of attention weights, at least 32 values
/// * `b` - value panel, 32 rows of 128 values with leading dimension `ldb`
/// * `c` - output row, at least 128 values
/// * `accumulate` - add to the existing row instead of overwriting it
///
/// # Panics
///
/// Panics if a slice is shorter than the geometry requires.
#[inline]
pub fn kernel_wv_1x32x128(
    cap: VectorCapability,
    a: &[f16],
    b: &[f16],
    ldb: usize,
    c: &mut [f16],
    accumulate: bool,
) {
    WvPlan::new(cap).run(a, b, ldb, c, accumulate);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::naive::matmul_naive_ab;

    const WIDTHS: [usize; 6] = [128, 256, 384, 512, 1024, 2048];

    fn inputs() -> (Vec<f16>, Vec<f16>) {
        let a: Vec<f16> = (0..WV_DEPTH)
            .map(|i| f16::from_f32((i % 3) as f32 - 1.0))
            .collect();
        let b: Vec<f16> = (0..WV_DEPTH * WV_WIDTH)
            .map(|i| f16::from_f32((i % 11) as f32 - 5.0))
            .collect();
        (a, b)
    }

    #[test]
    fn test_kernel_wv_correctness() {
        let (a, b) = inputs();
        let mut expected = vec![0.0f32; WV_WIDTH];
        matmul_naive_ab(&a, &b, &mut expected, 1, WV_WIDTH, WV_DEPTH, WV_DEPTH, WV_WIDTH, WV_WIDTH);

        for bits in WIDTHS {
            let cap = VectorCapability::with_register_bits(bits).unwrap();
            let mut c = vec![f16::from_f32(-9.0); WV_WIDTH];
            kernel_wv_1x32x128(cap, &a, &b, WV_WIDTH, &mut c, false);

            for j in 0..WV_WIDTH {
                assert_eq!(
                    c[j].to_f32(),
                    expected[j],
                    "bits={} mismatch at {}",
                    bits,
                    j
                );
            }
        }
    }

    #[test]
    fn test_kernel_wv_accumulates() {
        let (a, b) = inputs();
        let previous: Vec<f16> = (0..WV_WIDTH)
            .map(|j| f16::from_f32((j % 13) as f32))
            .collect();

        for bits in WIDTHS {
            let cap = VectorCapability::with_register_bits(bits).unwrap();

            let mut fresh = vec![f16::ZERO; WV_WIDTH];
            kernel_wv_1x32x128(cap, &a, &b, WV_WIDTH, &mut fresh, false);

            let mut c = previous.clone();
            kernel_wv_1x32x128(cap, &a, &b, WV_WIDTH, &mut c, true);

            for j in 0..WV_WIDTH {
                assert_eq!(
                    c[j].to_f32(),
                    previous[j].to_f32() + fresh[j].to_f32(),
                    "bits={} mismatch at {}",
                    bits,
                    j
                );
            }
        }
    }

    #[test]
    fn test_kernel_wv_all_ones_with_padding() {
        let cap = VectorCapability::with_register_bits(384).unwrap();
        let ldb = WV_WIDTH + 16;
        let a = vec![f16::ONE; WV_DEPTH];
        let b = vec![f16::ONE; WV_DEPTH * ldb];

        let mut c = vec![f16::from_f32(7.0); WV_WIDTH + 1];
        kernel_wv_1x32x128(cap, &a, &b, ldb, &mut c, false);
        assert!(c[..WV_WIDTH].iter().all(|v| *v == f16::from_f32(32.0)));
        assert_eq!(c[WV_WIDTH], f16::from_f32(7.0));
    }

    #[test]
    fn test_accumulator_count_follows_width() {
        let counts: Vec<usize> = WIDTHS
            .iter()
            .map(|&bits| WvPlan::new(VectorCapability::with_register_bits(bits).unwrap()).accumulators())
            .collect();
        assert_eq!(counts, vec![16, 8, 6, 4, 2, 1]);
    }
}
