//! # Credit Vouchers
//!
//! Store credit issued to a customer, typically for a return or a goodwill
//! gesture. A voucher holds a balance that can be redeemed across several
//! sale documents until exhausted, cancelled or expired.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   Issued ──redeem──▶ PartiallyUsed ──redeem──▶ Used (balance = 0)       │
//! │     │                     │                                             │
//! │     ├──expiry passes──────┴──▶ Expired  (extend() can revive)           │
//! │     └──cancel─────────────────▶ Cancelled (terminal)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every redemption is appended to `usage_history`, so the full audit trail
//! travels with the voucher itself.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::types::ValidityWindow;
use crate::validation::{validate_code, validate_name};

// =============================================================================
// Status
// =============================================================================

/// Lifecycle state of a credit voucher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoucherStatus {
    Issued,
    PartiallyUsed,
    Used,
    Expired,
    Cancelled,
}

// =============================================================================
// Usage History
// =============================================================================

/// One redemption applied to a sale document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoucherUsage {
    pub id: Uuid,
    /// Sale document the redemption was applied to.
    pub document_id: String,
    pub amount: Money,
    /// Operator who applied the redemption.
    pub used_by: String,
    pub used_at: DateTime<Utc>,
    pub notes: Option<String>,
}

// =============================================================================
// Redemption Denial
// =============================================================================

/// Why a redemption or cancellation was refused.
///
/// This is an expected business outcome, not a hard error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VoucherDenied {
    #[error("voucher has expired")]
    Expired,
    #[error("voucher is already fully used")]
    FullyUsed,
    #[error("voucher has been cancelled")]
    Cancelled,
    #[error("redemption amount must be positive")]
    AmountNotPositive,
    #[error("insufficient voucher balance (available: {available})")]
    InsufficientBalance { available: Money },
}

// =============================================================================
// Credit Voucher
// =============================================================================

/// Store credit held by a customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditVoucher {
    pub id: Uuid,
    pub code: String,
    pub customer_id: Uuid,
    pub original_amount: Money,
    pub remaining_amount: Money,
    pub status: VoucherStatus,
    /// Why the voucher was issued; replaced by the cancellation reason on
    /// cancel.
    pub reason: String,
    /// Issue date and optional expiry. An unbounded end never expires.
    pub window: ValidityWindow,
    pub last_used: Option<DateTime<Utc>>,
    pub usage_history: Vec<VoucherUsage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CreditVoucher {
    /// Issues a voucher for a positive amount, valid from now.
    ///
    /// `validity_days` of `None` means the voucher never expires.
    pub fn new(
        code: &str,
        customer_id: Uuid,
        amount: Money,
        reason: &str,
        validity_days: Option<i64>,
    ) -> CoreResult<Self> {
        validate_code(code)?;
        validate_name(reason)?;
        if !amount.is_positive() {
            return Err(ValidationError::MustBePositive {
                field: "amount".to_string(),
            }
            .into());
        }

        let now = Utc::now();
        let window = match validity_days {
            Some(days) => ValidityWindow::between(now, now + Duration::days(days)),
            None => ValidityWindow::starting(now),
        };

        Ok(CreditVoucher {
            id: Uuid::new_v4(),
            code: code.trim().to_uppercase(),
            customer_id,
            original_amount: amount,
            remaining_amount: amount,
            status: VoucherStatus::Issued,
            reason: reason.trim().to_string(),
            window,
            last_used: None,
            usage_history: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    // -------------------------------------------------------------------------
    // Redemption
    // -------------------------------------------------------------------------

    /// Whether `amount` could be redeemed right now.
    ///
    /// Same checks as [`CreditVoucher::redeem`] without mutating anything.
    pub fn can_redeem(&self, amount: Money, now: DateTime<Utc>) -> Result<(), VoucherDenied> {
        match self.status {
            VoucherStatus::Cancelled => return Err(VoucherDenied::Cancelled),
            VoucherStatus::Used => return Err(VoucherDenied::FullyUsed),
            VoucherStatus::Expired => return Err(VoucherDenied::Expired),
            VoucherStatus::Issued | VoucherStatus::PartiallyUsed => {}
        }
        if self.window.is_expired(now) {
            return Err(VoucherDenied::Expired);
        }
        if !amount.is_positive() {
            return Err(VoucherDenied::AmountNotPositive);
        }
        if amount > self.remaining_amount {
            return Err(VoucherDenied::InsufficientBalance {
                available: self.remaining_amount,
            });
        }
        Ok(())
    }

    /// Redeems part of the balance against a sale document.
    ///
    /// Appends the usage record and moves the status to `PartiallyUsed` or
    /// `Used`. A voucher found past its expiry is marked `Expired` and the
    /// redemption refused.
    pub fn redeem(
        &mut self,
        amount: Money,
        document_id: &str,
        used_by: &str,
        notes: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), VoucherDenied> {
        if let Err(denial) = self.can_redeem(amount, now) {
            if denial == VoucherDenied::Expired && self.status != VoucherStatus::Cancelled {
                self.status = VoucherStatus::Expired;
                self.updated_at = now;
            }
            return Err(denial);
        }

        self.usage_history.push(VoucherUsage {
            id: Uuid::new_v4(),
            document_id: document_id.to_string(),
            amount,
            used_by: used_by.to_string(),
            used_at: now,
            notes: notes.map(str::to_string),
        });
        self.remaining_amount -= amount;
        self.last_used = Some(now);
        self.status = if self.remaining_amount.is_zero() {
            VoucherStatus::Used
        } else {
            VoucherStatus::PartiallyUsed
        };
        self.updated_at = now;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Cancels the voucher, voiding any remaining balance.
    ///
    /// A fully used voucher has nothing left to cancel.
    pub fn cancel(&mut self, reason: &str) -> Result<(), VoucherDenied> {
        match self.status {
            VoucherStatus::Used => return Err(VoucherDenied::FullyUsed),
            VoucherStatus::Cancelled => return Err(VoucherDenied::Cancelled),
            _ => {}
        }
        self.status = VoucherStatus::Cancelled;
        self.reason = reason.to_string();
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Pushes the expiry forward by `days`, reviving an expired voucher
    /// that still has balance.
    ///
    /// A voucher with no expiry gets one `days` from now.
    pub fn extend(&mut self, days: i64, now: DateTime<Utc>) {
        self.window.valid_to = match self.window.valid_to {
            Some(to) => Some(to + Duration::days(days)),
            None => Some(now + Duration::days(days)),
        };

        if self.status == VoucherStatus::Expired && self.remaining_amount.is_positive() {
            self.status = if self.remaining_amount == self.original_amount {
                VoucherStatus::Issued
            } else {
                VoucherStatus::PartiallyUsed
            };
        }
        self.updated_at = now;
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.window.is_expired(now)
    }

    /// Whether the voucher can still be redeemed at all.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        match self.status {
            VoucherStatus::Cancelled | VoucherStatus::Expired | VoucherStatus::Used => {
                return false
            }
            VoucherStatus::Issued | VoucherStatus::PartiallyUsed => {}
        }
        !self.window.is_expired(now) && self.remaining_amount.is_positive()
    }

    /// Amount redeemed so far.
    pub fn total_used(&self) -> Money {
        self.original_amount - self.remaining_amount
    }

    /// Redeemed share of the original amount, as a percentage for display.
    pub fn usage_percent(&self) -> f64 {
        if !self.original_amount.is_positive() {
            return 0.0;
        }
        self.total_used().cents() as f64 / self.original_amount.cents() as f64 * 100.0
    }

    /// Whole days until expiry. `None` for a voucher that never expires,
    /// zero once the expiry has passed.
    pub fn days_until_expiry(&self, now: DateTime<Utc>) -> Option<i64> {
        let to = self.window.valid_to?;
        if now > to {
            return Some(0);
        }
        Some((to - now).num_days())
    }

    /// Whether the voucher expires within `days` (but has not yet).
    pub fn is_expiring_soon(&self, days: i64, now: DateTime<Utc>) -> bool {
        match self.days_until_expiry(now) {
            Some(remaining) => remaining > 0 && remaining <= days,
            None => false,
        }
    }

    pub fn last_usage(&self) -> Option<&VoucherUsage> {
        self.usage_history.last()
    }

    /// Validates structural consistency before persisting.
    pub fn validate(&self) -> CoreResult<()> {
        validate_code(&self.code)?;
        if !self.original_amount.is_positive() {
            return Err(ValidationError::MustBePositive {
                field: "original_amount".to_string(),
            }
            .into());
        }
        if self.remaining_amount.is_negative() || self.remaining_amount > self.original_amount {
            return Err(ValidationError::OutOfRange {
                field: "remaining_amount".to_string(),
                min: 0,
                max: self.original_amount.cents(),
            }
            .into());
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn voucher_of(cents: i64) -> CreditVoucher {
        CreditVoucher::new(
            "VC-0001",
            Uuid::new_v4(),
            Money::from_cents(cents),
            "Reso fattura 2026/114",
            Some(365),
        )
        .unwrap()
    }

    #[test]
    fn test_issue_requires_positive_amount() {
        let err = CreditVoucher::new(
            "VC-0001",
            Uuid::new_v4(),
            Money::zero(),
            "Reso",
            None,
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_partial_redemption_tracks_balance_and_history() {
        let now = Utc::now();
        let mut voucher = voucher_of(10_000);

        voucher
            .redeem(Money::from_cents(3_000), "DOC-001", "mrossi", None, now)
            .unwrap();
        assert_eq!(voucher.status, VoucherStatus::PartiallyUsed);
        assert_eq!(voucher.remaining_amount.cents(), 7_000);
        assert_eq!(voucher.total_used().cents(), 3_000);
        assert!((voucher.usage_percent() - 30.0).abs() < 0.01);
        assert_eq!(voucher.usage_history.len(), 1);
        assert_eq!(voucher.last_usage().unwrap().document_id, "DOC-001");

        voucher
            .redeem(Money::from_cents(7_000), "DOC-002", "mrossi", None, now)
            .unwrap();
        assert_eq!(voucher.status, VoucherStatus::Used);
        assert!(voucher.remaining_amount.is_zero());
        assert!(!voucher.is_valid(now));

        assert_eq!(
            voucher.redeem(Money::from_cents(100), "DOC-003", "mrossi", None, now),
            Err(VoucherDenied::FullyUsed)
        );
    }

    #[test]
    fn test_redemption_cannot_exceed_balance() {
        let now = Utc::now();
        let mut voucher = voucher_of(5_000);

        assert_eq!(
            voucher.redeem(Money::from_cents(6_000), "DOC-001", "mrossi", None, now),
            Err(VoucherDenied::InsufficientBalance {
                available: Money::from_cents(5_000)
            })
        );
        // Nothing moved.
        assert_eq!(voucher.remaining_amount.cents(), 5_000);
        assert!(voucher.usage_history.is_empty());
    }

    #[test]
    fn test_expired_redemption_denied_and_status_flipped() {
        let mut voucher = voucher_of(5_000);
        let past_expiry = Utc::now() + Duration::days(400);

        assert_eq!(
            voucher.redeem(Money::from_cents(100), "DOC-001", "mrossi", None, past_expiry),
            Err(VoucherDenied::Expired)
        );
        assert_eq!(voucher.status, VoucherStatus::Expired);
    }

    #[test]
    fn test_extend_revives_expired_voucher() {
        let now = Utc::now();
        let mut voucher = voucher_of(5_000);
        voucher
            .redeem(Money::from_cents(1_000), "DOC-001", "mrossi", None, now)
            .unwrap();

        let past_expiry = now + Duration::days(400);
        let _ = voucher.redeem(Money::from_cents(100), "DOC-002", "mrossi", None, past_expiry);
        assert_eq!(voucher.status, VoucherStatus::Expired);

        voucher.extend(60, past_expiry);
        assert_eq!(voucher.status, VoucherStatus::PartiallyUsed);
        assert!(voucher.can_redeem(Money::from_cents(100), past_expiry).is_ok());
    }

    #[test]
    fn test_cancel_rules() {
        let now = Utc::now();
        let mut voucher = voucher_of(5_000);

        voucher.cancel("Emesso per errore").unwrap();
        assert_eq!(voucher.status, VoucherStatus::Cancelled);
        assert_eq!(voucher.reason, "Emesso per errore");
        assert_eq!(voucher.cancel("di nuovo"), Err(VoucherDenied::Cancelled));
        assert_eq!(
            voucher.redeem(Money::from_cents(100), "DOC-001", "mrossi", None, now),
            Err(VoucherDenied::Cancelled)
        );

        let mut used = voucher_of(5_000);
        used.redeem(Money::from_cents(5_000), "DOC-001", "mrossi", None, now)
            .unwrap();
        assert_eq!(used.cancel("tardi"), Err(VoucherDenied::FullyUsed));
    }

    #[test]
    fn test_expiry_queries() {
        let now = Utc::now();
        let voucher = voucher_of(5_000);

        assert!(!voucher.is_expired(now));
        let days = voucher.days_until_expiry(now).unwrap();
        assert!((364..=365).contains(&days));
        assert!(!voucher.is_expiring_soon(30, now));
        assert!(voucher.is_expiring_soon(30, now + Duration::days(350)));

        let open_ended =
            CreditVoucher::new("VC-0002", Uuid::new_v4(), Money::from_cents(100), "Reso", None)
                .unwrap();
        assert!(open_ended.days_until_expiry(now).is_none());
        assert!(!open_ended.is_expiring_soon(30, now));
        assert!(!open_ended.is_expired(now + Duration::days(10_000)));
    }

    #[test]
    fn test_validate_catches_inconsistent_balance() {
        let mut voucher = voucher_of(5_000);
        assert!(voucher.validate().is_ok());

        voucher.remaining_amount = Money::from_cents(6_000);
        assert!(voucher.validate().is_err());
    }
}
