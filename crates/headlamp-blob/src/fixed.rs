use std::ops::{Add, AddAssign};

use num_traits::Zero;

use crate::error::BlobError;

/// Number of fractional bits of a [`Fixed`] value.
pub const FRACTIONAL_BITS: u32 = 16;

/// Number of integer bits of a [`Fixed`] value, not counting the sign.
pub const INTEGER_BITS: u32 = 1;

// sign + integer + fractional
const TOTAL_BITS: u32 = 1 + INTEGER_BITS + FRACTIONAL_BITS;
const WRAP_SHIFT: u32 = i32::BITS - TOTAL_BITS;
const SCALE: f64 = (1u32 << FRACTIONAL_BITS) as f64;

/// Signed fixed-point number with 1 integer bit and 16 fractional bits.
///
/// The value is stored as a scaled integer (`value * 2^16`), so it covers
/// `[-2, 2)` with a resolution of `2^-16`. Conversion from floating point
/// truncates toward negative infinity and addition wraps inside the 18-bit
/// range, the same way the hardware fixed-point types behave.
///
/// # Examples
///
/// ```
/// use headlamp_blob::fixed::Fixed;
///
/// let threshold = Fixed::from_f64(0.49).unwrap();
/// assert_eq!(threshold.raw(), 32112);
/// assert!(threshold < Fixed::ONE);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fixed(i32);

impl Fixed {
    /// The zero value.
    pub const ZERO: Fixed = Fixed(0);

    /// The value one.
    pub const ONE: Fixed = Fixed(1 << FRACTIONAL_BITS);

    /// The smallest representable step, `2^-16`.
    pub const EPSILON: Fixed = Fixed(1);

    /// The smallest representable value, `-2`.
    pub const MIN: Fixed = Fixed(-(1 << (INTEGER_BITS + FRACTIONAL_BITS)));

    /// The largest representable value, `2 - 2^-16`.
    pub const MAX: Fixed = Fixed((1 << (INTEGER_BITS + FRACTIONAL_BITS)) - 1);

    /// Create a value from its raw scaled representation.
    ///
    /// # Errors
    ///
    /// Returns [`BlobError::FixedPointOverflow`] if `raw` is outside the 18-bit range.
    pub fn from_raw(raw: i32) -> Result<Self, BlobError> {
        if raw < Self::MIN.0 || raw > Self::MAX.0 {
            return Err(BlobError::FixedPointOverflow(raw as f64 / SCALE));
        }
        Ok(Self(raw))
    }

    /// Convert a floating point value, truncating toward negative infinity.
    ///
    /// # Errors
    ///
    /// Returns [`BlobError::FixedPointOverflow`] if the value is not finite or
    /// does not fit `[-2, 2)`.
    pub fn from_f64(value: f64) -> Result<Self, BlobError> {
        if !value.is_finite() {
            return Err(BlobError::FixedPointOverflow(value));
        }

        let raw = (value * SCALE).floor();
        if raw < Self::MIN.0 as f64 || raw > Self::MAX.0 as f64 {
            return Err(BlobError::FixedPointOverflow(value));
        }

        Ok(Self(raw as i32))
    }

    /// The raw scaled representation, `value * 2^16`.
    #[inline]
    pub fn raw(self) -> i32 {
        self.0
    }

    /// Convert to floating point. Exact, every fixed value is representable.
    #[inline]
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / SCALE
    }

    /// Add two values, returning `None` instead of wrapping on overflow.
    #[inline]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        Self::from_raw(self.0 + rhs.0).ok()
    }

    /// Add two values, wrapping around inside the 18-bit range.
    #[inline]
    pub fn wrapping_add(self, rhs: Self) -> Self {
        // both operands hold 18 significant bits, the i32 sum cannot overflow
        Self(((self.0 + rhs.0) << WRAP_SHIFT) >> WRAP_SHIFT)
    }
}

impl Add for Fixed {
    type Output = Fixed;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        self.wrapping_add(rhs)
    }
}

impl AddAssign for Fixed {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = self.wrapping_add(rhs);
    }
}

impl Zero for Fixed {
    fn zero() -> Self {
        Self::ZERO
    }

    fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl std::iter::Sum for Fixed {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Fixed::zero(), |acc, x| acc + x)
    }
}

impl std::fmt::Display for Fixed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_f64())
    }
}

impl TryFrom<f64> for Fixed {
    type Error = BlobError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::from_f64(value)
    }
}
