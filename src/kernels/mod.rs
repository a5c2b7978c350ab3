//! Fixed-geometry f16 microkernels for attention products.
//!
//! Both kernels compute one output row per call and reuse every A scalar
//! across the full output width: a lane of A is broadcast and multiplied
//! against a register of B, accumulating into one register per output slice.
//! The number of accumulators follows the runtime lane count; when the lane
//! count doesn't divide the tile width, the last accumulator runs under a
//! prefix predicate.
//!
//! Available kernels:
//! - `kernel_qk_1x128x32`: query × keyᵀ, 128-deep reduction, 32 outputs
//! - `kernel_wv_1x32x128`: weights × value, 32-deep reduction, 128 outputs

pub mod kernel_qk_1x128x32;
pub mod kernel_wv_1x32x128;

use half::f16;

use crate::vector::capability::MIN_REGISTER_BITS;
use crate::vector::{Predicate, Register};

/// Reduction steps consumed per outer iteration; one block of A values.
pub const STEP_BLOCK: usize = 16;

/// Fewest f16 lanes any register has.
pub(crate) const MIN_F16_LANES: usize = MIN_REGISTER_BITS / 16;

/// One `STEP_BLOCK` of A, loaded as whole registers so individual lanes can
/// be broadcast. Narrow registers need two loads to cover the block.
pub(crate) struct BroadcastBlock {
    regs: [Register<f16>; STEP_BLOCK.div_ceil(MIN_F16_LANES)],
    lanes: usize,
}

impl BroadcastBlock {
    /// `src` must hold at least `STEP_BLOCK` values.
    #[inline]
    pub(crate) fn load(lanes: usize, src: &[f16]) -> Self {
        let mut regs = [Register::zero(); STEP_BLOCK.div_ceil(MIN_F16_LANES)];
        for (r, reg) in regs.iter_mut().enumerate() {
            let base = r * lanes;
            if base >= STEP_BLOCK {
                break;
            }
            let pg = Predicate::while_lt(base, STEP_BLOCK, lanes);
            *reg = Register::load(&pg, &src[base..]);
        }
        Self { regs, lanes }
    }

    /// Register and lane index holding reduction step `step` of the block.
    #[inline]
    pub(crate) fn lane(&self, step: usize) -> (&Register<f16>, usize) {
        (&self.regs[step / self.lanes], step % self.lanes)
    }
}

/// Split of a `width`-wide output row into lane-sized accumulator slices.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OutputTiling<const MAX: usize> {
    lanes: usize,
    count: usize,
    predicates: [Predicate; MAX],
}

impl<const MAX: usize> OutputTiling<MAX> {
    pub(crate) fn new(lanes: usize, width: usize) -> Self {
        let count = width.div_ceil(lanes);
        debug_assert!(count <= MAX, "{} accumulators exceed the {} reserved", count, MAX);

        let mut predicates = [Predicate::none(lanes); MAX];
        for (t, pg) in predicates.iter_mut().enumerate().take(count) {
            *pg = Predicate::while_lt(t * lanes, width, lanes);
        }
        Self {
            lanes,
            count,
            predicates,
        }
    }

    #[inline]
    pub(crate) fn count(&self) -> usize {
        self.count
    }

    #[inline]
    pub(crate) fn predicate(&self, t: usize) -> &Predicate {
        &self.predicates[t]
    }

    /// First output column covered by accumulator `t`.
    #[inline]
    pub(crate) fn offset(&self, t: usize) -> usize {
        t * self.lanes
    }
}
