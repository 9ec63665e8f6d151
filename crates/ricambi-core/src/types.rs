//! # Shared Domain Types
//!
//! Small value types used across the Ricambi domain.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Shared Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌──────────────────┐   ┌──────────────────┐     │
//! │  │  DiscountRate   │   │  ValidityWindow  │   │ CustomerCategory │     │
//! │  │  ─────────────  │   │  ──────────────  │   │  ──────────────  │     │
//! │  │  bps (u32)      │   │  valid_from?     │   │  Retail          │     │
//! │  │  1525 = 15.25%  │   │  valid_to?       │   │  Wholesale ...   │     │
//! │  └─────────────────┘   └──────────────────┘   └──────────────────┘     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Discount Rate
// =============================================================================

/// A percentage rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1525 bps = 15.25%, representable exactly where `f64` is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DiscountRate(u32);

impl DiscountRate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        DiscountRate(bps)
    }

    /// Creates a rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        DiscountRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        DiscountRate(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for DiscountRate {
    fn default() -> Self {
        DiscountRate::zero()
    }
}

// =============================================================================
// Validity Window
// =============================================================================

/// A half-open validity period with optional bounds.
///
/// A missing bound means unbounded in that direction: net prices, discount
/// rules and promotions all carry one of these. `None` replaces the
/// zero-timestamp sentinel used by legacy data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidityWindow {
    /// Start of validity (inclusive). `None` = valid since forever.
    pub valid_from: Option<DateTime<Utc>>,
    /// End of validity (inclusive). `None` = never expires.
    pub valid_to: Option<DateTime<Utc>>,
}

impl ValidityWindow {
    /// A window with no bounds: always valid.
    pub const fn unbounded() -> Self {
        ValidityWindow {
            valid_from: None,
            valid_to: None,
        }
    }

    /// A window bounded on both sides.
    pub const fn between(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        ValidityWindow {
            valid_from: Some(from),
            valid_to: Some(to),
        }
    }

    /// A window starting at `from` and never expiring.
    pub const fn starting(from: DateTime<Utc>) -> Self {
        ValidityWindow {
            valid_from: Some(from),
            valid_to: None,
        }
    }

    /// Checks whether `now` falls inside the window.
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        if let Some(from) = self.valid_from {
            if now < from {
                return false;
            }
        }
        if let Some(to) = self.valid_to {
            if now > to {
                return false;
            }
        }
        true
    }

    /// Checks whether the window has already ended.
    ///
    /// An unbounded end never expires.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.valid_to {
            Some(to) => now > to,
            None => false,
        }
    }

    /// Checks that the bounds are ordered (`from <= to` when both present).
    pub fn is_ordered(&self) -> bool {
        match (self.valid_from, self.valid_to) {
            (Some(from), Some(to)) => from <= to,
            _ => true,
        }
    }
}

// =============================================================================
// Customer Category
// =============================================================================

/// Commercial category of a customer account.
///
/// Used by promotion applicability filters and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerCategory {
    Retail,
    Wholesale,
    Workshop,
    Dealer,
    Vip,
}

impl Default for CustomerCategory {
    fn default() -> Self {
        CustomerCategory::Retail
    }
}

// =============================================================================
// Operator Profile
// =============================================================================

/// Authorization profile of a terminal operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorProfile {
    /// Full access, can authorize any discount.
    Admin,
    /// Day-to-day management, bounded discount authority.
    Manager,
    /// Sales terminal only.
    Clerk,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn test_rate_from_bps() {
        let rate = DiscountRate::from_bps(1525);
        assert_eq!(rate.bps(), 1525);
        assert!((rate.percentage() - 15.25).abs() < 0.001);
    }

    #[test]
    fn test_rate_from_percentage() {
        let rate = DiscountRate::from_percentage(15.25);
        assert_eq!(rate.bps(), 1525);
    }

    #[test]
    fn test_unbounded_window_always_contains() {
        let window = ValidityWindow::unbounded();
        assert!(window.contains(Utc::now()));
        assert!(!window.is_expired(Utc::now()));
    }

    #[test]
    fn test_window_bounds() {
        let now = Utc::now();
        let window = ValidityWindow::between(now - Duration::days(1), now + Duration::days(1));

        assert!(window.contains(now));
        assert!(!window.contains(now - Duration::days(2)));
        assert!(!window.contains(now + Duration::days(2)));
        assert!(window.is_expired(now + Duration::days(2)));
    }

    #[test]
    fn test_window_not_yet_started() {
        let now = Utc::now();
        let window = ValidityWindow::starting(now + Duration::days(1));

        assert!(!window.contains(now));
        // Not started is not the same as expired.
        assert!(!window.is_expired(now));
    }

    #[test]
    fn test_window_ordering() {
        let now = Utc::now();
        assert!(ValidityWindow::between(now, now + Duration::days(1)).is_ordered());
        assert!(!ValidityWindow::between(now + Duration::days(1), now).is_ordered());
        assert!(ValidityWindow::unbounded().is_ordered());
    }
}
