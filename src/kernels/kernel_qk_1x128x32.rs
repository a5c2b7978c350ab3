//! 1×128×32 query·key microkernel.

use half::f16;

use super::{BroadcastBlock, MIN_F16_LANES, OutputTiling, STEP_BLOCK};
use crate::vector::{Register, VectorCapability};

/// Reduction depth (query/key head size).
pub const QK_DEPTH: usize = 128;

/// Output width (keys per tile).
pub const QK_WIDTH: usize = 32;

const QK_MAX_ACCUMULATORS: usize = QK_WIDTH / MIN_F16_LANES;

/// Lane split of the 1×32 output for one vector width, resolved once and
/// reused for every row of a sweep.
#[derive(Debug, Clone, Copy)]
pub struct QkPlan {
    lanes: usize,
    tiling: OutputTiling<QK_MAX_ACCUMULATORS>,
}

impl QkPlan {
    pub fn new(cap: VectorCapability) -> Self {
        let lanes = cap.lanes_of::<f16>();
        Self {
            lanes,
            tiling: OutputTiling::new(lanes, QK_WIDTH),
        }
    }

    /// Accumulator registers this width needs (2 at 256 bits).
    pub fn accumulators(&self) -> usize {
        self.tiling.count()
    }

    /// Computes `c[j] = sum_x a[x] * b[j * ldb + x]` for `j < 32`, `x < 128`.
    ///
    /// For every block of 16 reduction steps, each accumulator's slice of B
    /// is gathered into 16 registers up front; then each A scalar is
    /// broadcast once per slice. Always overwrites `c`.
    #[inline]
    pub fn run(&self, a: &[f16], b: &[f16], ldb: usize, c: &mut [f16]) {
        let mut acc = [Register::<f16>::zero(); QK_MAX_ACCUMULATORS];
        let mut b_slots = [Register::<f16>::zero(); STEP_BLOCK];

        for block in (0..QK_DEPTH).step_by(STEP_BLOCK) {
            let a_block = BroadcastBlock::load(self.lanes, &a[block..]);

            for t in 0..self.tiling.count() {
                let pg = self.tiling.predicate(t);
                let b_panel = &b[self.tiling.offset(t) * ldb + block..];

                // B rows are output columns: step s of this slice is a
                // column gather with stride ldb.
                for (s, slot) in b_slots.iter_mut().enumerate() {
                    *slot = Register::load_strided(pg, &b_panel[s..], ldb);
                }

                for (s, slot) in b_slots.iter().enumerate() {
                    let (a_reg, lane) = a_block.lane(s);
                    acc[t] = acc[t].fmla_lane(pg, slot, a_reg, lane);
                }
            }
        }

        for t in 0..self.tiling.count() {
            acc[t].store(self.tiling.predicate(t), &mut c[self.tiling.offset(t)..]);
        }
    }
}

/// Computes one 1×32 row: `C[0, j] = sum_x A[0, x] * B[j, x]`.
///
/// # Arguments
///
/// * `a` - one query row, at least 128 values
/// * `b` - key panel, 32 rows of 128 values with leading dimension `ldb`
/// * `c` - output row, at least 32 values; overwritten, never read
///
/// # Panics
///
/// Panics if a slice is shorter than the geometry requires.
#[inline]
pub fn kernel_qk_1x128x32(cap: VectorCapability, a: &[f16], b: &[f16], ldb: usize, c: &mut [f16]) {
    QkPlan::new(cap).run(a, b, ldb, c);
}
