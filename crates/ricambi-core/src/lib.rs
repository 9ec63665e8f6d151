//! # ricambi-core: Pure Business Logic for Ricambi
//!
//! This crate is the **heart** of Ricambi, a warehouse and parts-management
//! system. It contains the pricing, discount and kit logic as pure functions
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Ricambi Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Terminal / Service Layer                       │   │
//! │  │    article lookup ──► quote ──► commit ──► stock movements      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ ricambi-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌───────────┐ ┌──────────────┐    │   │
//! │  │   │  money   │ │ article  │ │ customer  │ │  promotion   │    │   │
//! │  │   │  Money   │ │  stock   │ │ fido/grid │ │ kinds/filters│    │   │
//! │  │   └──────────┘ └──────────┘ └───────────┘ └──────────────┘    │   │
//! │  │   ┌──────────────────────┐ ┌──────────┐ ┌──────────────┐     │   │
//! │  │   │       pricing        │ │   kit    │ │   operator   │     │   │
//! │  │   │ DiscountCalculation  │ │ bottleneck│ │  authority   │     │   │
//! │  │   └──────────────────────┘ └──────────┘ └──────────────┘     │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 ricambi-store (Storage Layer)                   │   │
//! │  │        repositories, session store, pricing/stock services      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`types`] - Shared value types (rates, validity windows, categories)
//! - [`article`] - Catalog articles: stock, net prices, sottocosto guard
//! - [`customer`] - Customer accounts: fido credit and the discount grid
//! - [`promotion`] - Promotional campaigns, filters, usage caps
//! - [`pricing`] - Final price calculation with mutual-exclusion policy
//! - [`kit`] - Composite products: availability and atomic reservation
//! - [`voucher`] - Credit vouchers: partial redemption, expiry, cancellation
//! - [`operator`] - Terminal operators and discount authority
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use ricambi_core::money::Money;
//! use ricambi_core::types::DiscountRate;
//!
//! // Create money from cents (never from floats!)
//! let price = Money::from_cents(10_000); // €100.00
//!
//! // A discount cascade is sequential, not additive
//! let cascade = [DiscountRate::from_bps(1000), DiscountRate::from_bps(1000)];
//! assert_eq!(price.apply_cascade(&cascade).cents(), 8_100); // 19%, not 20%
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod article;
pub mod customer;
pub mod error;
pub mod kit;
pub mod money;
pub mod operator;
pub mod pricing;
pub mod promotion;
pub mod types;
pub mod validation;
pub mod voucher;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use ricambi_core::Money` instead of
// `use ricambi_core::money::Money`

pub use article::{Article, NetPrice, PricingInfo, StockInfo};
pub use customer::{Customer, DiscountRule, RuleDiscount, RuleScope};
pub use error::{CoreError, CoreResult, ValidationError};
pub use kit::{Kit, KitComponent, PricingStrategy, Shortage};
pub use money::Money;
pub use operator::Operator;
pub use pricing::{calculate_final_price, find_best_promotion, DiscountCalculation};
pub use promotion::{Promotion, PromotionKind, UsageDenial};
pub use types::*;
pub use voucher::{CreditVoucher, VoucherDenied, VoucherStatus, VoucherUsage};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length for entity codes (articles, customers, kits, promotions)
///
/// ## Business Reason
/// Codes print on labels and receipts with fixed column widths; supplier
/// catalogs in this sector never exceed this.
pub const MAX_CODE_LENGTH: usize = 50;

/// Maximum quantity on a single sale line
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 10000 instead of 10).
/// Bulk movements above this go through a stock transfer, not a sale line.
pub const MAX_LINE_QUANTITY: i64 = 9_999;
