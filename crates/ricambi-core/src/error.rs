//! # Error Types
//!
//! Domain-specific error types for ricambi-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  ricambi-core errors (this file)                                       │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  ricambi-store errors (separate crate)                                 │
//! │  └── StoreError       - Repository operation failures                  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → StoreError → caller               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Note that "not applicable" outcomes (a promotion a customer cannot use,
//! a kit that cannot be fulfilled) are expressed as value results
//! (`UsageDenial`, `Vec<Shortage>`), not as these hard errors.
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (article code, quantities, etc.)
//! 3. Errors are enum variants, never String

use thiserror::Error;

use crate::kit::Shortage;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-facing messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Insufficient available stock for a removal or reservation.
    ///
    /// Available stock is `on_hand - reserved`; a reservation may never
    /// push `available` below zero.
    #[error("insufficient stock for {code}: available {available}, requested {requested}")]
    InsufficientStock {
        code: String,
        available: i64,
        requested: i64,
    },

    /// Attempt to release more stock than is currently reserved.
    #[error("cannot release {requested} units of {code}: only {reserved} reserved")]
    ReleaseExceedsReserved {
        code: String,
        reserved: i64,
        requested: i64,
    },

    /// A kit requires at least two components to be sellable.
    #[error("kit must have at least 2 components, found {found}")]
    InvalidKitComponents { found: usize },

    /// A kit component references an article that is not in the snapshot.
    #[error("article not found for component: {code}")]
    ComponentNotFound { code: String },

    /// A referenced component is not part of the kit.
    #[error("component {code} not found in kit")]
    ComponentNotInKit { code: String },

    /// Kit fulfillment failed; every shortage is listed, not just the first.
    #[error("cannot fulfill kit {code}: {}", .shortages.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(", "))]
    KitUnfulfillable {
        code: String,
        shortages: Vec<Shortage>,
    },

    /// The promotion's rules are inconsistent with its kind.
    #[error("invalid promotion rule: {reason}")]
    InvalidPromotionRule { reason: String },

    /// Operator profile does not allow a discount this large.
    #[error("discount {requested_bps} bps exceeds authorized limit ({max_bps} bps) for this operator")]
    DiscountNotAuthorized { requested_bps: u32, max_bps: u32 },

    /// Validation error (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// A percentage rate outside (0, 100].
    #[error("{field} must be a rate between 0 and 10000 bps, got {bps}")]
    InvalidRate { field: String, bps: u32 },

    /// A validity window whose start is after its end.
    #[error("valid_from must be before valid_to")]
    InvalidWindow,

    /// A numeric range whose minimum meets or exceeds its maximum.
    #[error("{field}: minimum {min} must be below maximum {max}")]
    InvalidRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., bad characters in a code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
