//! Software model of one scalable vector register.
//!
//! Storage is sized for the widest register (2048 bits of 16-bit lanes) so a
//! register is a plain stack value; the active width always comes from the
//! [`Predicate`] passed to each operation. Lanes outside a predicate are never
//! read from or written to memory.

use std::fmt;

use half::f16;

use crate::vector::capability::{ElementWidth, MAX_REGISTER_BITS, Predicate};

/// Lanes in the widest possible register at 16 bits per lane.
pub const MAX_REGISTER_LANES: usize = MAX_REGISTER_BITS / 16;

/// Element type that can live in a vector lane.
pub trait Lane: Copy + Default + PartialEq + fmt::Debug + 'static {
    const WIDTH: ElementWidth;
    const ZERO: Self;

    /// `self + a * b` with a single rounding.
    fn mul_add(self, a: Self, b: Self) -> Self;

    fn add(self, other: Self) -> Self;
}

impl Lane for f16 {
    const WIDTH: ElementWidth = ElementWidth::B16;
    const ZERO: Self = f16::ZERO;

    #[inline]
    fn mul_add(self, a: Self, b: Self) -> Self {
        // f16 * f16 is exact in f64, so only the final narrowing rounds.
        f16::from_f64(self.to_f64() + a.to_f64() * b.to_f64())
    }

    #[inline]
    fn add(self, other: Self) -> Self {
        f16::from_f64(self.to_f64() + other.to_f64())
    }
}

impl Lane for f32 {
    const WIDTH: ElementWidth = ElementWidth::B32;
    const ZERO: Self = 0.0;

    #[inline]
    fn mul_add(self, a: Self, b: Self) -> Self {
        a.mul_add(b, self)
    }

    #[inline]
    fn add(self, other: Self) -> Self {
        self + other
    }
}

#[derive(Clone, Copy)]
pub struct Register<T: Lane> {
    lanes: [T; MAX_REGISTER_LANES],
}

impl<T: Lane> fmt::Debug for Register<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Register")
            .field("lanes", &&self.lanes[..])
            .finish()
    }
}

impl<T: Lane> Default for Register<T> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<T: Lane> Register<T> {
    #[inline]
    pub fn zero() -> Self {
        Self {
            lanes: [T::ZERO; MAX_REGISTER_LANES],
        }
    }

    /// Active lanes hold `value`, the rest are zero.
    #[inline]
    pub fn splat(pg: &Predicate, value: T) -> Self {
        let mut r = Self::zero();
        for i in pg.active() {
            r.lanes[i] = value;
        }
        r
    }

    /// Contiguous load: lane `i` reads `src[i]` when active, else becomes zero.
    #[inline]
    pub fn load(pg: &Predicate, src: &[T]) -> Self {
        let mut r = Self::zero();
        let active = pg.active();
        r.lanes[active.clone()].copy_from_slice(&src[active]);
        r
    }

    /// Gather load: lane `i` reads `src[i * stride]` when active.
    #[inline]
    pub fn load_strided(pg: &Predicate, src: &[T], stride: usize) -> Self {
        let mut r = Self::zero();
        for i in pg.active() {
            r.lanes[i] = src[i * stride];
        }
        r
    }

    /// Lane `i` is written to `dst[i]` when active; inactive lanes leave
    /// memory untouched.
    #[inline]
    pub fn store(&self, pg: &Predicate, dst: &mut [T]) {
        let active = pg.active();
        dst[active.clone()].copy_from_slice(&self.lanes[active]);
    }

    #[inline]
    pub fn lane(&self, index: usize) -> T {
        self.lanes[index]
    }

    /// `self + a * b` on active lanes; inactive lanes keep their value.
    #[inline]
    pub fn fmla(mut self, pg: &Predicate, a: &Self, b: &Self) -> Self {
        for i in pg.active() {
            self.lanes[i] = self.lanes[i].mul_add(a.lanes[i], b.lanes[i]);
        }
        self
    }

    /// `self + a * s` with the scalar `s` broadcast across active lanes.
    #[inline]
    pub fn fmla_broadcast(mut self, pg: &Predicate, a: &Self, s: T) -> Self {
        for i in pg.active() {
            self.lanes[i] = self.lanes[i].mul_add(a.lanes[i], s);
        }
        self
    }

    /// `self + a * src[index]`, the broadcast taken from a lane of `src`.
    #[inline]
    pub fn fmla_lane(self, pg: &Predicate, a: &Self, src: &Self, index: usize) -> Self {
        self.fmla_broadcast(pg, a, src.lanes[index])
    }

    /// Horizontal sum of the active lanes, lowest lane first.
    #[inline]
    pub fn add_across(&self, pg: &Predicate) -> T {
        pg.active().fold(T::ZERO, |acc, i| acc.add(self.lanes[i]))
    }

    /// Interleave the low halves: `[s0, o0, s1, o1, ...]` over `lanes` lanes.
    #[inline]
    pub fn zip1(&self, other: &Self, lanes: usize) -> Self {
        let mut r = Self::zero();
        for i in 0..lanes / 2 {
            r.lanes[2 * i] = self.lanes[i];
            r.lanes[2 * i + 1] = other.lanes[i];
        }
        r
    }

    /// Concatenate the even lanes of `self` then of `other` over `lanes` lanes.
    #[inline]
    pub fn uzp1(&self, other: &Self, lanes: usize) -> Self {
        let half = lanes / 2;
        let mut r = Self::zero();
        for i in 0..half {
            r.lanes[i] = self.lanes[2 * i];
            r.lanes[half + i] = other.lanes[2 * i];
        }
        r
    }
}

impl Register<f16> {
    /// Convert the even 16-bit lanes (the low half of each 32-bit container)
    /// to f32. `pg` is a 32-bit predicate; inactive lanes become zero.
    #[inline]
    pub fn widen_even(&self, pg: &Predicate) -> Register<f32> {
        let mut r = Register::<f32>::zero();
        for i in pg.active() {
            r.lanes[i] = self.lanes[2 * i].to_f32();
        }
        r
    }
}

impl Register<f32> {
    /// Round each active f32 lane to f16 into the even 16-bit lane of its
    /// container. Odd lanes and inactive containers are zero.
    #[inline]
    pub fn narrow_even(&self, pg: &Predicate) -> Register<f16> {
        let mut r = Register::<f16>::zero();
        for i in pg.active() {
            r.lanes[2 * i] = f16::from_f32(self.lanes[i]);
        }
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(v: f32) -> f16 {
        f16::from_f32(v)
    }

    #[test]
    fn test_load_respects_predicate() {
        let src: Vec<f16> = (0..4).map(|i| h(i as f32 + 1.0)).collect();
        // Only 4 elements exist; a 16-lane load must not touch past them.
        let r = Register::load(&Predicate::while_lt(0, 4, 16), &src);
        for i in 0..4 {
            assert_eq!(r.lane(i), src[i]);
        }
        for i in 4..16 {
            assert_eq!(r.lane(i), f16::ZERO);
        }
    }

    #[test]
    fn test_store_leaves_inactive_memory() {
        let r = Register::splat(&Predicate::all(8), 3.0f32);
        let mut dst = vec![-1.0f32; 8];
        r.store(&Predicate::suffix(3, 8), &mut dst);
        assert_eq!(dst, vec![-1.0, -1.0, -1.0, -1.0, -1.0, 3.0, 3.0, 3.0]);
    }

    #[test]
    fn test_load_strided_gathers_column() {
        let src: Vec<f32> = (0..32).map(|i| i as f32).collect();
        let r = Register::load_strided(&Predicate::while_lt(0, 4, 8), &src, 8);
        assert_eq!(
            [r.lane(0), r.lane(1), r.lane(2), r.lane(3), r.lane(4)],
            [0.0, 8.0, 16.0, 24.0, 0.0]
        );
    }

    #[test]
    fn test_fmla_merges_inactive_lanes() {
        let all = Predicate::all(8);
        let acc = Register::splat(&all, 1.0f32);
        let a = Register::splat(&all, 2.0f32);
        let b = Register::splat(&all, 5.0f32);
        let r = acc.fmla(&Predicate::while_lt(0, 2, 8), &a, &b);
        assert_eq!(r.lane(0), 11.0);
        assert_eq!(r.lane(1), 11.0);
        assert_eq!(r.lane(2), 1.0);
    }

    #[test]
    fn test_fmla_lane_broadcasts() {
        let pg = Predicate::all(16);
        let src: Vec<f16> = (0..16).map(|i| h(i as f32)).collect();
        let a = Register::load(&pg, &src);
        let acc = Register::<f16>::zero().fmla_lane(&pg, &a, &a, 3);
        for i in 0..16 {
            assert_eq!(acc.lane(i), h(i as f32 * 3.0));
        }
    }

    #[test]
    fn test_f16_mul_add_rounds_once() {
        // (1 + 2^-10)^2 = 1 + 2^-9 + 2^-20; rounding the product first
        // would cancel to zero.
        let x = h(1.0 + 2f32.powi(-10));
        let r = Lane::mul_add(h(-(1.0 + 2f32.powi(-9))), x, x);
        assert_eq!(r, h(2f32.powi(-20)));
        assert_ne!(r, f16::ZERO);
    }

    #[test]
    fn test_add_across_sums_active_lanes() {
        let src: Vec<f32> = (1..=8).map(|i| i as f32).collect();
        let r = Register::load(&Predicate::all(8), &src);
        assert_eq!(r.add_across(&Predicate::all(8)), 36.0);
        assert_eq!(r.add_across(&Predicate::while_lt(0, 3, 8)), 6.0);
    }

    #[test]
    fn test_zip_widen_narrow_uzp() {
        let lanes16 = 16;
        let pg16 = Predicate::while_lt(lanes16 / 2, lanes16, lanes16);
        let pg32 = Predicate::all(lanes16 / 2);
        let src: Vec<f16> = (0..8).map(|i| h(i as f32 * 0.5)).collect();

        let loaded = Register::load(&pg16, &src);
        let wide = loaded.zip1(&Register::zero(), lanes16).widen_even(&pg32);
        for i in 0..8 {
            assert_eq!(wide.lane(i), i as f32 * 0.5);
        }

        let narrow = wide.narrow_even(&pg32).uzp1(&Register::zero(), lanes16);
        for i in 0..8 {
            assert_eq!(narrow.lane(i), src[i]);
            assert_eq!(narrow.lane(8 + i), f16::ZERO);
        }
    }
}
