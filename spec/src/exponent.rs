//! Rational exponents: the power a unit or dimension is raised to.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Neg;

use thiserror::Error;

/// Largest magnitude allowed for a numerator or denominator.
///
/// Every `i32` fits, and products of two components fit in `i64`.
pub const MAX_COMPONENT: i64 = 1 << 31;

/// Error raised when constructing a [`RationalExponent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExponentError {
    /// The denominator is zero.
    #[error("exponent {numerator}/0 has a zero denominator")]
    ZeroDenominator {
        /// The numerator that was supplied alongside the zero denominator.
        numerator: i64,
    },
    /// A component exceeds [`MAX_COMPONENT`] in magnitude.
    #[error("exponent {numerator}/{denominator} is out of range")]
    OutOfRange {
        /// Supplied numerator.
        numerator: i64,
        /// Supplied denominator.
        denominator: i64,
    },
}

/// An immutable `numerator / denominator` power, e.g. `Time^-2` or `Length^(1/2)`.
///
/// The stored pair is kept exactly as supplied; no reduction is forced on
/// construction. Equality and hashing compare the reduced forms, so `2/4`
/// and `1/2` are the same exponent. Both components stay within
/// [`MAX_COMPONENT`]; arithmetic that would leave that range returns `None`.
#[derive(Debug, Clone, Copy)]
pub struct RationalExponent {
    numerator: i64,
    denominator: i64,
}

impl RationalExponent {
    /// The exponent `0`.
    pub const ZERO: Self = Self::integer(0);
    /// The exponent `1`.
    pub const ONE: Self = Self::integer(1);

    /// Creates `numerator / denominator`.
    ///
    /// # Errors
    ///
    /// Returns [`ExponentError::ZeroDenominator`] if `denominator` is zero and
    /// [`ExponentError::OutOfRange`] if either component exceeds
    /// [`MAX_COMPONENT`] in magnitude.
    pub fn new(numerator: i64, denominator: i64) -> Result<Self, ExponentError> {
        if denominator == 0 {
            return Err(ExponentError::ZeroDenominator { numerator });
        }
        let limit = MAX_COMPONENT.unsigned_abs();
        if numerator.unsigned_abs() > limit || denominator.unsigned_abs() > limit {
            return Err(ExponentError::OutOfRange {
                numerator,
                denominator,
            });
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// Creates the integral exponent `n / 1`.
    #[must_use]
    pub const fn integer(n: i32) -> Self {
        Self {
            numerator: n as i64,
            denominator: 1,
        }
    }

    /// The numerator as supplied.
    #[must_use]
    pub fn numerator(self) -> i64 {
        self.numerator
    }

    /// The denominator as supplied (never zero).
    #[must_use]
    pub fn denominator(self) -> i64 {
        self.denominator
    }

    /// Returns the equivalent exponent in lowest terms with a positive denominator.
    #[must_use]
    pub fn reduced(self) -> Self {
        let g = gcd(self.numerator.unsigned_abs(), self.denominator.unsigned_abs()).max(1);
        // Components are bounded by MAX_COMPONENT, so `g` fits and negation cannot overflow.
        let g = g as i64;
        let sign = if self.denominator < 0 { -1 } else { 1 };
        Self {
            numerator: sign * self.numerator / g,
            denominator: sign * self.denominator / g,
        }
    }

    /// True when the reduced denominator is one.
    #[must_use]
    pub fn is_integer(self) -> bool {
        self.reduced().denominator == 1
    }

    /// True for the zero exponent.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.numerator == 0
    }

    /// True for exponents strictly greater than zero.
    #[must_use]
    pub fn is_positive(self) -> bool {
        let r = self.reduced();
        r.numerator > 0
    }

    /// True for exponents strictly less than zero.
    #[must_use]
    pub fn is_negative(self) -> bool {
        let r = self.reduced();
        r.numerator < 0
    }

    /// The absolute value, reduced.
    #[must_use]
    pub fn abs(self) -> Self {
        let r = self.reduced();
        Self {
            numerator: r.numerator.abs(),
            denominator: r.denominator,
        }
    }

    /// `self + rhs`, reduced, or `None` if the result leaves the allowed range.
    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        let (a, b) = (i128::from(self.numerator), i128::from(self.denominator));
        let (c, d) = (i128::from(rhs.numerator), i128::from(rhs.denominator));
        Self::from_wide(a * d + c * b, b * d)
    }

    /// `self * rhs`, reduced, or `None` if the result leaves the allowed range.
    #[must_use]
    pub fn checked_mul(self, rhs: Self) -> Option<Self> {
        Self::from_wide(
            i128::from(self.numerator) * i128::from(rhs.numerator),
            i128::from(self.denominator) * i128::from(rhs.denominator),
        )
    }

    fn from_wide(numerator: i128, denominator: i128) -> Option<Self> {
        let g = gcd_wide(numerator.unsigned_abs(), denominator.unsigned_abs()).max(1);
        let g = i128::try_from(g).ok()?;
        let sign = if denominator < 0 { -1 } else { 1 };
        let numerator = i64::try_from(sign * numerator / g).ok()?;
        let denominator = i64::try_from(sign * denominator / g).ok()?;
        Self::new(numerator, denominator).ok()
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

fn gcd_wide(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

impl Default for RationalExponent {
    fn default() -> Self {
        Self::ONE
    }
}

impl PartialEq for RationalExponent {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = (self.reduced(), other.reduced());
        a.numerator == b.numerator && a.denominator == b.denominator
    }
}

impl Eq for RationalExponent {}

impl Hash for RationalExponent {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let r = self.reduced();
        r.numerator.hash(state);
        r.denominator.hash(state);
    }
}

impl Neg for RationalExponent {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            numerator: -self.numerator,
            denominator: self.denominator,
        }
    }
}

/// Formats as `n` for integral exponents and `n/d` otherwise, always reduced.
impl fmt::Display for RationalExponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.reduced();
        if r.denominator == 1 {
            write!(f, "{}", r.numerator)
        } else {
            write!(f, "{}/{}", r.numerator, r.denominator)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn exp(n: i64, d: i64) -> RationalExponent {
        RationalExponent::new(n, d).unwrap()
    }

    #[test]
    fn zero_denominator_rejected() {
        assert_eq!(
            RationalExponent::new(3, 0),
            Err(ExponentError::ZeroDenominator { numerator: 3 })
        );
    }

    #[test]
    fn out_of_range_components_rejected() {
        assert!(RationalExponent::new(MAX_COMPONENT, -MAX_COMPONENT).is_ok());
        assert_eq!(
            RationalExponent::new(i64::MIN, 1),
            Err(ExponentError::OutOfRange {
                numerator: i64::MIN,
                denominator: 1
            })
        );
        assert!(RationalExponent::new(1, MAX_COMPONENT + 1).is_err());
    }

    #[test]
    fn equality_uses_reduced_form() {
        assert_eq!(exp(2, 4), exp(1, 2));
        assert_eq!(exp(-2, -4), exp(1, 2));
        assert_eq!(exp(2, -4), exp(-1, 2));
        assert_ne!(exp(1, 2), exp(1, 3));

        let mut set = HashSet::new();
        set.insert(exp(3, 6));
        assert!(set.contains(&exp(1, 2)));
    }

    #[test]
    fn stored_pair_is_not_reduced() {
        let e = exp(2, 4);
        assert_eq!(e.numerator(), 2);
        assert_eq!(e.denominator(), 4);
        assert_eq!(e.reduced().numerator(), 1);
        assert_eq!(e.reduced().denominator(), 2);
    }

    #[test]
    fn arithmetic() {
        assert_eq!(exp(1, 2).checked_add(exp(1, 3)), Some(exp(5, 6)));
        assert_eq!(
            exp(-2, 1).checked_mul(exp(1, 2)),
            Some(RationalExponent::integer(-1))
        );
        assert!(exp(1, 2).checked_add(exp(-1, 2)).unwrap().is_zero());
        assert_eq!(-exp(3, 4), exp(-3, 4));
    }

    #[test]
    fn arithmetic_reports_overflow_instead_of_wrapping() {
        let tiny = exp(1, 3_037_000_500);
        assert_eq!(tiny.checked_mul(tiny), None);
        let big = exp(MAX_COMPONENT, 1);
        assert_eq!(big.checked_add(big), None);
        assert_eq!(big.checked_mul(exp(1, 2)), Some(exp(1 << 30, 1)));
        // Large intermediates that reduce back into range are fine.
        assert_eq!(big.checked_mul(exp(1, MAX_COMPONENT)), Some(RationalExponent::ONE));
    }

    #[test]
    fn extreme_components_reduce_without_panicking() {
        let e = exp(-MAX_COMPONENT, -MAX_COMPONENT);
        assert_eq!(e.reduced(), RationalExponent::ONE);
        assert_eq!(exp(MAX_COMPONENT, -2).to_string(), format!("-{}", 1_i64 << 30));
    }

    #[test]
    fn sign_and_integrality() {
        assert!(exp(-2, 1).is_negative());
        assert!(exp(1, -2).is_negative());
        assert!(exp(-1, -2).is_positive());
        assert!(exp(4, 2).is_integer());
        assert!(!exp(3, 2).is_integer());
        assert_eq!(exp(-3, 2).abs(), exp(3, 2));
    }

    #[test]
    fn display() {
        assert_eq!(RationalExponent::integer(-2).to_string(), "-2");
        assert_eq!(exp(2, 4).to_string(), "1/2");
        assert_eq!(exp(3, -6).to_string(), "-1/2");
    }
}
