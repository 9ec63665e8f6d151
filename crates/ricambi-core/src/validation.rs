//! # Validation Module
//!
//! Input validation utilities for Ricambi.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Terminal input masks                                         │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate operator feedback                                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (Rust)                                           │
//! │  ├── Codes, quantities, rates, ranges                                  │
//! │  └── Runs before any business logic                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Entity `validate()` methods                                  │
//! │  └── Cross-field invariants (windows, kit component counts)            │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::{MAX_CODE_LENGTH, MAX_LINE_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an entity code (article, customer, kit or promotion code).
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 50 characters
/// - Only alphanumeric characters, hyphens, underscores
///
/// ## Example
/// ```rust
/// use ricambi_core::validation::validate_code;
///
/// assert!(validate_code("FLT-OIL-01").is_ok());
/// assert!(validate_code("").is_err());
/// assert!(validate_code("has space").is_err());
/// ```
pub fn validate_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.len() > MAX_CODE_LENGTH {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: MAX_CODE_LENGTH,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a display name (article description, company name, kit name).
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_QUANTITY
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in cents.
///
/// Zero is allowed: promotional giveaways have a zero net price.
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a discount rate in basis points.
///
/// ## Rules
/// - Must be at most 10000 (100%)
/// - Zero is allowed (a rule can be parked without deleting it)
pub fn validate_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10_000 {
        return Err(ValidationError::InvalidRate {
            field: "discount_rate".to_string(),
            bps,
        });
    }

    Ok(())
}

/// Validates every step of a discount cascade.
pub fn validate_cascade(cascade: &[crate::types::DiscountRate]) -> ValidationResult<()> {
    for rate in cascade {
        validate_rate_bps(rate.bps())?;
    }
    Ok(())
}

/// Validates an optional min/max incentive range (quantity or amount).
///
/// When both bounds are present the minimum must be strictly below the
/// maximum; a min >= max range could never be satisfied.
pub fn validate_range(field: &str, min: Option<i64>, max: Option<i64>) -> ValidationResult<()> {
    if let (Some(min), Some(max)) = (min, max) {
        if min >= max {
            return Err(ValidationError::InvalidRange {
                field: field.to_string(),
                min,
                max,
            });
        }
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
