//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A discount grid applied in float64 drifts by fractions of a cent      │
//! │  per line item and the day's totals never reconcile.                   │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    1000 cents / 3 = 333 cents (×3 = 999 cents)                         │
//! │    We KNOW we lost 1 cent, and handle it explicitly                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use ricambi_core::money::Money;
//! use ricambi_core::types::DiscountRate;
//!
//! // Create from cents (preferred)
//! let price = Money::from_cents(10_000); // €100.00
//!
//! // Percentage math stays in integer cents
//! let discount = price.discount_part(DiscountRate::from_bps(1500)); // 15%
//! assert_eq!(discount.cents(), 1500);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::types::DiscountRate;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for credits and discount deltas
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// Every monetary value in the system flows through this type: list prices,
/// net-price overrides, discount amounts, kit prices, credit exposure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use ricambi_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents €10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units (euros and cents).
    ///
    /// For negative amounts, only the major unit should be negative:
    /// `from_major_minor(-5, 50)` = -€5.50, not -€4.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (euros) portion.
    #[inline]
    pub const fn euros(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use ricambi_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299); // €2.99
    /// let line_total = unit_price.multiply_quantity(3);
    /// assert_eq!(line_total.cents(), 897); // €8.97
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Returns the portion of this amount covered by a percentage rate.
    ///
    /// This is the *discount amount*, not the remainder. Uses integer math
    /// with half-up rounding: `(cents * bps + 5000) / 10000`.
    ///
    /// ## Example
    /// ```rust
    /// use ricambi_core::money::Money;
    /// use ricambi_core::types::DiscountRate;
    ///
    /// let base = Money::from_cents(10_000);               // €100.00
    /// let part = base.discount_part(DiscountRate::from_bps(1525)); // 15.25%
    /// assert_eq!(part.cents(), 1525);                     // €15.25
    /// ```
    pub fn discount_part(&self, rate: DiscountRate) -> Money {
        // i128 to prevent overflow on large amounts
        let part = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(part as i64)
    }

    /// Applies a percentage discount and returns the remaining amount.
    ///
    /// ## Example
    /// ```rust
    /// use ricambi_core::money::Money;
    /// use ricambi_core::types::DiscountRate;
    ///
    /// let subtotal = Money::from_cents(10_000); // €100.00
    /// let discounted = subtotal.apply_discount(DiscountRate::from_bps(1000));
    /// assert_eq!(discounted.cents(), 9_000);    // €90.00
    /// ```
    pub fn apply_discount(&self, rate: DiscountRate) -> Money {
        *self - self.discount_part(rate)
    }

    /// Applies a discount cascade: each rate reduces the output of the
    /// previous step, it is NOT a sum of percentages.
    ///
    /// ## Example
    /// ```rust
    /// use ricambi_core::money::Money;
    /// use ricambi_core::types::DiscountRate;
    ///
    /// let base = Money::from_cents(10_000); // €100.00
    /// let cascade = [DiscountRate::from_bps(1000), DiscountRate::from_bps(1000)];
    /// // 100 × 0.9 × 0.9 = 81: a 19% effective discount, not 20%
    /// assert_eq!(base.apply_cascade(&cascade).cents(), 8_100);
    /// ```
    pub fn apply_cascade(&self, cascade: &[DiscountRate]) -> Money {
        cascade
            .iter()
            .fold(*self, |price, rate| price.apply_discount(*rate))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for debugging and logs. Terminal rendering formats for locale.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}€{}.{:02}", sign, self.euros().abs(), self.cents_part())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by integer (for quantity calculations).
impl Mul<i32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i32) -> Self {
        Money(self.0 * qty as i64)
    }
}

/// Multiplication by i64.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.euros(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_from_major_minor() {
        let money = Money::from_major_minor(10, 99);
        assert_eq!(money.cents(), 1099);

        let negative = Money::from_major_minor(-5, 50);
        assert_eq!(negative.cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "€10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "€5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-€5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "€0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        let result: Money = a * 3;
        assert_eq!(result.cents(), 3000);
    }

    #[test]
    fn test_discount_part_basic() {
        // €10.00 at 10% = €1.00
        let amount = Money::from_cents(1000);
        let part = amount.discount_part(DiscountRate::from_bps(1000));
        assert_eq!(part.cents(), 100);
    }

    #[test]
    fn test_discount_part_with_rounding() {
        // €10.00 at 8.25% = €0.825 → €0.83 (half-up with +5000)
        let amount = Money::from_cents(1000);
        let part = amount.discount_part(DiscountRate::from_bps(825));
        assert_eq!(part.cents(), 83);
    }

    #[test]
    fn test_apply_discount() {
        let subtotal = Money::from_cents(10_000); // €100.00
        let discounted = subtotal.apply_discount(DiscountRate::from_bps(1000));
        assert_eq!(discounted.cents(), 9_000); // €90.00
    }

    #[test]
    fn test_cascade_is_sequential_not_additive() {
        // [10, 10] on €100.00 → 100 × 0.9 × 0.9 = €81.00 (19% effective)
        let base = Money::from_cents(10_000);
        let cascade = [DiscountRate::from_bps(1000), DiscountRate::from_bps(1000)];
        let result = base.apply_cascade(&cascade);
        assert_eq!(result.cents(), 8_100);
        assert_ne!(result.cents(), 8_000); // NOT 20%
    }

    #[test]
    fn test_empty_cascade_is_identity() {
        let base = Money::from_cents(4242);
        assert_eq!(base.apply_cascade(&[]), base);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let positive = Money::from_cents(100);
        assert!(positive.is_positive());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_cents(299);
        let line_total = unit_price.multiply_quantity(3);
        assert_eq!(line_total.cents(), 897);
    }

    /// Documents the intentional precision loss of integer division when a
    /// line-level discount is normalized back to a per-unit amount.
    #[test]
    fn test_division_precision_loss_documented() {
        let ten_euros = Money::from_cents(1000);
        let one_third = Money::from_cents(1000 / 3); // 333 cents
        let reconstructed: Money = one_third * 3; // 999 cents

        assert_eq!(reconstructed.cents(), 999);
        assert_ne!(reconstructed.cents(), ten_euros.cents());

        let lost = ten_euros - reconstructed;
        assert_eq!(lost.cents(), 1);
    }
}
