//! # Operators
//!
//! Terminal operator accounts and their discount authority. Deep manual
//! discounts need an admin profile at the till.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::types::{DiscountRate, OperatorProfile};
use crate::validation::{validate_code, validate_name};

/// Manual discounts above this need an admin profile.
pub const MAX_UNPRIVILEGED_DISCOUNT_BPS: u32 = 2_000;

/// A terminal operator account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operator {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    pub profile: OperatorProfile,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Operator {
    pub fn new(username: &str, display_name: &str, profile: OperatorProfile) -> CoreResult<Self> {
        validate_code(username)?;
        validate_name(display_name)?;

        let now = Utc::now();
        Ok(Operator {
            id: Uuid::new_v4(),
            username: username.trim().to_lowercase(),
            display_name: display_name.trim().to_string(),
            profile,
            is_active: true,
            last_login: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Largest manual discount this operator may grant.
    pub const fn max_discount(&self) -> DiscountRate {
        match self.profile {
            OperatorProfile::Admin => DiscountRate::from_bps(10_000),
            OperatorProfile::Manager | OperatorProfile::Clerk => {
                DiscountRate::from_bps(MAX_UNPRIVILEGED_DISCOUNT_BPS)
            }
        }
    }

    /// Checks that this operator may grant a manual discount.
    pub fn authorize_discount(&self, requested: DiscountRate) -> CoreResult<()> {
        let max = self.max_discount();
        if requested.bps() > max.bps() {
            return Err(CoreError::DiscountNotAuthorized {
                requested_bps: requested.bps(),
                max_bps: max.bps(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clerk_capped_at_twenty_percent() {
        let clerk = Operator::new("mario", "Mario Bianchi", OperatorProfile::Clerk).unwrap();
        assert!(clerk.authorize_discount(DiscountRate::from_bps(2_000)).is_ok());

        let err = clerk
            .authorize_discount(DiscountRate::from_bps(2_001))
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::DiscountNotAuthorized {
                requested_bps: 2_001,
                max_bps: 2_000,
            }
        ));
    }

    #[test]
    fn test_admin_unrestricted() {
        let admin = Operator::new("anna", "Anna Verdi", OperatorProfile::Admin).unwrap();
        assert!(admin.authorize_discount(DiscountRate::from_bps(10_000)).is_ok());
    }

    #[test]
    fn test_username_normalized() {
        let op = Operator::new(" MARIO ", "Mario Bianchi", OperatorProfile::Manager).unwrap();
        assert_eq!(op.username, "mario");
    }
}
