//! Runtime vector capability: lane counts and predicate masks.

use std::ops::Range;
use std::sync::OnceLock;

use log::debug;

use crate::error::KernelError;
use crate::vector::register::Lane;

/// Narrowest register width any supported vector extension provides.
pub const MIN_REGISTER_BITS: usize = 128;

/// Widest register width the architecture allows (SVE upper bound).
pub const MAX_REGISTER_BITS: usize = 2048;

/// Element bit-widths a lane can have. Closed set, so an unsupported
/// width can't be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementWidth {
    B8,
    B16,
    B32,
    B64,
}

impl ElementWidth {
    pub const fn bits(self) -> usize {
        match self {
            Self::B8 => 8,
            Self::B16 => 16,
            Self::B32 => 32,
            Self::B64 => 64,
        }
    }
}

/// Vector width of the executing core.
///
/// Holds the physical register length in bits; every lane count is derived
/// from it. Cheap to copy, so kernels take it by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VectorCapability {
    register_bits: usize,
}

static DETECTED: OnceLock<VectorCapability> = OnceLock::new();

impl VectorCapability {
    /// Capability of the current CPU. Detected on first call, then cached:
    /// the register width never changes for the lifetime of the process.
    ///
    /// The cache holds only that hardware fact, never kernel state. Only the
    /// convenience entry points consult it; kernels read the width from the
    /// capability passed in, so a caller that discovers the width some other
    /// way can skip this and use [`VectorCapability::with_register_bits`].
    pub fn detect() -> Self {
        *DETECTED.get_or_init(|| {
            let (isa, bits) = detect_register_bits();
            let cap = Self {
                register_bits: bits,
            };
            debug!(
                "vector capability: isa={} bits={} lanes(f16)={} lanes(f32)={}",
                isa,
                bits,
                cap.lanes(ElementWidth::B16),
                cap.lanes(ElementWidth::B32)
            );
            cap
        })
    }

    /// Capability for an explicit register width, e.g. to run the kernels as
    /// a 384-bit SVE implementation would.
    pub fn with_register_bits(bits: usize) -> Result<Self, KernelError> {
        if bits < MIN_REGISTER_BITS || bits > MAX_REGISTER_BITS || bits % MIN_REGISTER_BITS != 0 {
            return Err(KernelError::InvalidRegisterWidth { bits });
        }
        Ok(Self {
            register_bits: bits,
        })
    }

    pub fn register_bits(&self) -> usize {
        self.register_bits
    }

    /// Number of `width`-bit elements a full register holds.
    #[inline]
    pub fn lanes(&self, width: ElementWidth) -> usize {
        self.register_bits / width.bits()
    }

    /// Predicate selecting every lane of a full register at `width`.
    #[inline]
    pub fn ptrue(&self, width: ElementWidth) -> Predicate {
        Predicate::all(self.lanes(width))
    }

    #[inline]
    pub fn lanes_of<T: Lane>(&self) -> usize {
        self.lanes(T::WIDTH)
    }

    #[inline]
    pub fn ptrue_of<T: Lane>(&self) -> Predicate {
        self.ptrue(T::WIDTH)
    }
}

#[cfg(all(target_arch = "aarch64", target_os = "linux"))]
fn detect_register_bits() -> (&'static str, usize) {
    const PR_SVE_GET_VL: libc::c_int = 51;
    const PR_SVE_VL_LEN_MASK: libc::c_int = 0xffff;

    if std::arch::is_aarch64_feature_detected!("sve") {
        // Safety: PR_SVE_GET_VL takes no further arguments and only reads
        // the calling thread's vector length.
        let ret = unsafe { libc::prctl(PR_SVE_GET_VL) };
        if ret > 0 {
            let bits = ((ret & PR_SVE_VL_LEN_MASK) as usize) * 8;
            if let Ok(cap) = VectorCapability::with_register_bits(bits) {
                return ("sve", cap.register_bits);
            }
        }
    }
    ("neon", MIN_REGISTER_BITS)
}

#[cfg(all(target_arch = "aarch64", not(target_os = "linux")))]
fn detect_register_bits() -> (&'static str, usize) {
    ("neon", MIN_REGISTER_BITS)
}

#[cfg(target_arch = "x86_64")]
fn detect_register_bits() -> (&'static str, usize) {
    if is_x86_feature_detected!("avx512f") {
        ("avx512", 512)
    } else if is_x86_feature_detected!("avx2") {
        ("avx2", 256)
    } else {
        ("sse", MIN_REGISTER_BITS)
    }
}

#[cfg(not(any(target_arch = "aarch64", target_arch = "x86_64")))]
fn detect_register_bits() -> (&'static str, usize) {
    ("scalar", MIN_REGISTER_BITS)
}

/// Per-lane enable mask for a register of `lanes` elements.
///
/// Active lanes always form one contiguous run: all lanes, a prefix
/// (`while_lt`) or a suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Predicate {
    first: usize,
    count: usize,
    lanes: usize,
}

impl Predicate {
    #[inline]
    pub fn all(lanes: usize) -> Self {
        Self {
            first: 0,
            count: lanes,
            lanes,
        }
    }

    #[inline]
    pub fn none(lanes: usize) -> Self {
        Self {
            first: 0,
            count: 0,
            lanes,
        }
    }

    /// Lane `i` is active iff `base + i < limit`.
    #[inline]
    pub fn while_lt(base: usize, limit: usize, lanes: usize) -> Self {
        Self {
            first: 0,
            count: limit.saturating_sub(base).min(lanes),
            lanes,
        }
    }

    /// The last `count` lanes.
    #[inline]
    pub fn suffix(count: usize, lanes: usize) -> Self {
        let count = count.min(lanes);
        Self {
            first: lanes - count,
            count,
            lanes,
        }
    }

    #[inline]
    pub fn lanes(&self) -> usize {
        self.lanes
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.count == self.lanes
    }

    #[inline]
    pub fn is_active(&self, lane: usize) -> bool {
        lane >= self.first && lane < self.first + self.count
    }

    /// Indices of the active lanes.
    #[inline]
    pub fn active(&self) -> Range<usize> {
        self.first..self.first + self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use half::f16;

    #[test]
    fn test_lane_counts_per_width() {
        let cap = VectorCapability::with_register_bits(256).unwrap();
        assert_eq!(cap.lanes(ElementWidth::B8), 32);
        assert_eq!(cap.lanes(ElementWidth::B16), 16);
        assert_eq!(cap.lanes(ElementWidth::B32), 8);
        assert_eq!(cap.lanes(ElementWidth::B64), 4);
        assert_eq!(cap.lanes_of::<f16>(), 16);
        assert_eq!(cap.lanes_of::<f32>(), 8);
    }

    #[test]
    fn test_ptrue_selects_every_lane() {
        let cap = VectorCapability::with_register_bits(384).unwrap();
        let pg = cap.ptrue(ElementWidth::B16);
        assert_eq!(pg.count(), 24);
        assert!(pg.is_full());
        assert_eq!(pg.active(), 0..24);
        assert_eq!(cap.ptrue_of::<f32>().count(), 12);
    }

    #[test]
    fn test_invalid_register_widths_rejected() {
        for bits in [0, 64, 200, 2176, 4096] {
            assert_eq!(
                VectorCapability::with_register_bits(bits),
                Err(KernelError::InvalidRegisterWidth { bits })
            );
        }
        for bits in [128, 384, 640, 2048] {
            assert!(VectorCapability::with_register_bits(bits).is_ok());
        }
    }

    #[test]
    fn test_detect_is_stable() {
        let first = VectorCapability::detect();
        let second = VectorCapability::detect();
        assert_eq!(first, second);
        assert!(first.register_bits() >= MIN_REGISTER_BITS);
        assert_eq!(first.register_bits() % MIN_REGISTER_BITS, 0);
    }

    #[test]
    fn test_while_lt_prefix() {
        let pg = Predicate::while_lt(8, 16, 16);
        assert_eq!(pg.active(), 0..8);
        assert!(!pg.is_full());

        assert_eq!(Predicate::while_lt(0, 100, 16).active(), 0..16);
        assert_eq!(Predicate::while_lt(20, 16, 16).count(), 0);
        assert_eq!(Predicate::while_lt(24, 32, 24).active(), 0..8);
    }

    #[test]
    fn test_suffix() {
        let pg = Predicate::suffix(3, 8);
        assert_eq!(pg.active(), 5..8);
        assert!(pg.is_active(7));
        assert!(!pg.is_active(4));
        assert_eq!(Predicate::suffix(20, 8), Predicate::all(8));
        assert_eq!(Predicate::none(8).count(), 0);
    }
}
