//! Numeric substrate for the optimizer
//!
//! The optimizer is generic over [`Numeric`]. Two realizations ship:
//! - `f64`: plain IEEE double precision
//! - [`Fixed`]: signed 32-bit fixed point with a 64-bit multiply accumulator,
//!   bit-reproducible on any hardware
//!
//! ## Overflow
//!
//! The operator traits (`+`, `-`, `*`, unary `-`) on [`Fixed`] wrap silently,
//! with two's-complement semantics.
//! Callers that need to see overflow use the `checked_*` or `saturating_*`
//! forms; the optimizer does so under its configured overflow policy.

use core::fmt;
use core::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// Arithmetic contract shared by every numeric realization.
pub trait Numeric:
    Copy
    + PartialEq
    + PartialOrd
    + fmt::Debug
    + fmt::Display
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
    + Send
    + Sync
    + 'static
{
    /// Additive identity
    const ZERO: Self;
    /// Multiplicative identity
    const ONE: Self;
    /// Largest representable value; also the "no best yet" sentinel
    const MAX: Self;
    /// Smallest representable value
    const MIN: Self;

    /// Convert from a native float (rounding/saturating as the realization requires)
    fn from_f64(value: f64) -> Self;

    /// Convert to a native float for I/O
    fn to_f64(self) -> f64;

    /// `None` when `value` is NaN or lies outside the representable range
    fn checked_from_f64(value: f64) -> Option<Self>;

    /// `None` when the sum leaves the representable range
    fn checked_add(self, rhs: Self) -> Option<Self>;
    /// `None` when the difference leaves the representable range
    fn checked_sub(self, rhs: Self) -> Option<Self>;
    /// `None` when the product leaves the representable range
    fn checked_mul(self, rhs: Self) -> Option<Self>;

    fn wrapping_add(self, rhs: Self) -> Self;
    fn wrapping_sub(self, rhs: Self) -> Self;
    fn wrapping_mul(self, rhs: Self) -> Self;

    fn saturating_add(self, rhs: Self) -> Self;
    fn saturating_sub(self, rhs: Self) -> Self;
    fn saturating_mul(self, rhs: Self) -> Self;

    /// Whether the value can take part in a `<` comparison
    fn is_comparable(self) -> bool;
}

impl Numeric for f64 {
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;
    const MAX: Self = f64::MAX;
    const MIN: Self = f64::MIN;

    fn from_f64(value: f64) -> Self {
        value
    }

    fn to_f64(self) -> f64 {
        self
    }

    fn checked_from_f64(value: f64) -> Option<Self> {
        finite(value)
    }

    fn checked_add(self, rhs: Self) -> Option<Self> {
        finite(self + rhs)
    }

    fn checked_sub(self, rhs: Self) -> Option<Self> {
        finite(self - rhs)
    }

    fn checked_mul(self, rhs: Self) -> Option<Self> {
        finite(self * rhs)
    }

    fn wrapping_add(self, rhs: Self) -> Self {
        self + rhs
    }

    fn wrapping_sub(self, rhs: Self) -> Self {
        self - rhs
    }

    fn wrapping_mul(self, rhs: Self) -> Self {
        self * rhs
    }

    fn saturating_add(self, rhs: Self) -> Self {
        clamp_f64(self + rhs)
    }

    fn saturating_sub(self, rhs: Self) -> Self {
        clamp_f64(self - rhs)
    }

    fn saturating_mul(self, rhs: Self) -> Self {
        clamp_f64(self * rhs)
    }

    fn is_comparable(self) -> bool {
        !self.is_nan()
    }
}

fn finite(value: f64) -> Option<f64> {
    if value.is_finite() {
        Some(value)
    } else {
        None
    }
}

// NaN passes through unchanged; `is_comparable` catches it at evaluation time.
fn clamp_f64(value: f64) -> f64 {
    if value > f64::MAX {
        f64::MAX
    } else if value < f64::MIN {
        f64::MIN
    } else {
        value
    }
}

/// Signed fixed-point number stored in an `i32`.
///
/// `FRAC_BITS` fractional bits, `32 - FRAC_BITS` integer bits (sign included).
/// Products go through an `i64` accumulator and are rescaled with
/// round-half-away-from-zero. The representable range is symmetric:
/// `[-(2^(I-1) - 2^-F), 2^(I-1) - 2^-F]`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fixed<const FRAC_BITS: u32>(i32);

/// 16 integer bits, 16 fractional bits.
pub type Fix16 = Fixed<16>;

impl<const FRAC_BITS: u32> Fixed<FRAC_BITS> {
    const VALID_SPLIT: () = assert!(
        FRAC_BITS >= 1 && FRAC_BITS <= 30,
        "fixed-point split needs 1..=30 fractional bits"
    );

    /// Number of fractional bits
    pub const FRACTIONAL_BITS: u32 = FRAC_BITS;
    /// Number of integer bits, sign bit included
    pub const INTEGER_BITS: u32 = 32 - FRAC_BITS;
    /// Smallest positive step
    pub const RESOLUTION: Self = Self(1);

    const SCALE: f64 = (1u64 << FRAC_BITS) as f64;
    const MAX_RAW: i32 = i32::MAX;
    const MIN_RAW: i32 = -i32::MAX;

    /// Wrap a raw bit pattern
    pub const fn from_raw(raw: i32) -> Self {
        let () = Self::VALID_SPLIT;
        Self(raw)
    }

    /// The raw bit pattern
    pub const fn to_raw(self) -> i32 {
        self.0
    }

    /// Integer conversion (saturating)
    pub fn from_int(value: i32) -> Self {
        let () = Self::VALID_SPLIT;
        Self::narrow((value as i64) << FRAC_BITS).unwrap_or(if value < 0 {
            Self(Self::MIN_RAW)
        } else {
            Self(Self::MAX_RAW)
        })
    }

    /// Resolution as a float (`2^-FRAC_BITS`)
    pub fn resolution_f64() -> f64 {
        1.0 / Self::SCALE
    }

    fn narrow(wide: i64) -> Option<Self> {
        if wide > Self::MAX_RAW as i64 || wide < Self::MIN_RAW as i64 {
            None
        } else {
            Some(Self(wide as i32))
        }
    }

    fn clamp_wide(wide: i64) -> Self {
        Self(wide.clamp(Self::MIN_RAW as i64, Self::MAX_RAW as i64) as i32)
    }

    // i64 product rescaled by 2^FRAC_BITS, rounding half away from zero.
    fn wide_mul(self, rhs: Self) -> i64 {
        let product = (self.0 as i64) * (rhs.0 as i64);
        let halves = product / (1i64 << (FRAC_BITS - 1));
        halves / 2 + halves % 2
    }
}

impl<const FRAC_BITS: u32> Numeric for Fixed<FRAC_BITS> {
    const ZERO: Self = Self(0);
    const ONE: Self = Self(1 << FRAC_BITS);
    const MAX: Self = Self(i32::MAX);
    const MIN: Self = Self(-i32::MAX);

    fn from_f64(value: f64) -> Self {
        let () = Self::VALID_SPLIT;
        let scaled = value * Self::SCALE;
        // `round()` needs std; `as` truncates toward zero, saturates and maps NaN to 0.
        let rounded = if scaled >= 0.0 {
            scaled + 0.5
        } else {
            scaled - 0.5
        };
        Self::clamp_wide(rounded as i64)
    }

    fn to_f64(self) -> f64 {
        self.0 as f64 / Self::SCALE
    }

    fn checked_from_f64(value: f64) -> Option<Self> {
        // Anything that rounds onto the range is accepted.
        let limit = Self::MAX_RAW as f64 + 0.5;
        if (value * Self::SCALE).abs() <= limit {
            Some(Self::from_f64(value))
        } else {
            None
        }
    }

    fn checked_add(self, rhs: Self) -> Option<Self> {
        Self::narrow(self.0 as i64 + rhs.0 as i64)
    }

    fn checked_sub(self, rhs: Self) -> Option<Self> {
        Self::narrow(self.0 as i64 - rhs.0 as i64)
    }

    fn checked_mul(self, rhs: Self) -> Option<Self> {
        Self::narrow(self.wide_mul(rhs))
    }

    fn wrapping_add(self, rhs: Self) -> Self {
        Self(self.0.wrapping_add(rhs.0))
    }

    fn wrapping_sub(self, rhs: Self) -> Self {
        Self(self.0.wrapping_sub(rhs.0))
    }

    fn wrapping_mul(self, rhs: Self) -> Self {
        Self(self.wide_mul(rhs) as i32)
    }

    fn saturating_add(self, rhs: Self) -> Self {
        Self::clamp_wide(self.0 as i64 + rhs.0 as i64)
    }

    fn saturating_sub(self, rhs: Self) -> Self {
        Self::clamp_wide(self.0 as i64 - rhs.0 as i64)
    }

    fn saturating_mul(self, rhs: Self) -> Self {
        Self::clamp_wide(self.wide_mul(rhs))
    }

    fn is_comparable(self) -> bool {
        true
    }
}

impl<const FRAC_BITS: u32> Add for Fixed<FRAC_BITS> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.wrapping_add(rhs)
    }
}

impl<const FRAC_BITS: u32> Sub for Fixed<FRAC_BITS> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.wrapping_sub(rhs)
    }
}

impl<const FRAC_BITS: u32> Mul for Fixed<FRAC_BITS> {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        self.wrapping_mul(rhs)
    }
}

impl<const FRAC_BITS: u32> Neg for Fixed<FRAC_BITS> {
    type Output = Self;

    fn neg(self) -> Self {
        Self(self.0.wrapping_neg())
    }
}

impl<const FRAC_BITS: u32> fmt::Display for Fixed<FRAC_BITS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_f64(), f)
    }
}

impl<const FRAC_BITS: u32> fmt::Debug for Fixed<FRAC_BITS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fixed<{FRAC_BITS}>({} = {:#010x})", self.to_f64(), self.0)
    }
}
