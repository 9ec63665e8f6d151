//! # Article
//!
//! The article catalog entry: classification tags used by discount and
//! promotion matching, pricing (list price plus per-customer net-price
//! overrides), and warehouse stock with reservation accounting.
//!
//! ## Stock Invariant
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  available = on_hand − reserved                                         │
//! │                                                                         │
//! │  on_hand   ████████████████████  20                                     │
//! │  reserved  ██████                 6                                     │
//! │  available ──────────────────────14                                     │
//! │                                                                         │
//! │  A reservation may never push `available` below zero, and a release    │
//! │  may never exceed what is currently reserved.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! `available` is derived, never stored, so the invariant cannot drift.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{DiscountRate, ValidityWindow};
use crate::validation::{validate_code, validate_name};

// =============================================================================
// Stock
// =============================================================================

/// Warehouse stock figures for one article.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StockInfo {
    /// Physical units on the shelf.
    pub on_hand: i64,
    /// Units committed to open orders, not yet picked.
    pub reserved: i64,
    /// Restock trigger level.
    pub reorder_point: i64,
    /// Warehouse bin/location label.
    pub location: Option<String>,
    pub last_restock: Option<DateTime<Utc>>,
    pub last_movement: Option<DateTime<Utc>>,
}

impl StockInfo {
    /// Units free to sell or reserve: `on_hand - reserved`.
    #[inline]
    pub const fn available(&self) -> i64 {
        self.on_hand - self.reserved
    }
}

// =============================================================================
// Net Price
// =============================================================================

/// A customer-specific negotiated price overriding the list price.
///
/// At most one per customer; carries its own validity window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetPrice {
    pub customer_id: Uuid,
    pub price: Money,
    pub window: ValidityWindow,
}

// =============================================================================
// Pricing
// =============================================================================

/// Pricing block of an article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingInfo {
    pub list_price: Money,
    /// ISO 4217 code; everything in this system is priced in one currency.
    pub currency: String,
    /// Most recent supplier cost, used for the sottocosto margin guard.
    pub last_purchase_cost: Option<Money>,
    /// Per-customer net price overrides.
    pub net_prices: Vec<NetPrice>,
}

impl Default for PricingInfo {
    fn default() -> Self {
        PricingInfo {
            list_price: Money::zero(),
            currency: "EUR".to_string(),
            last_purchase_cost: None,
            net_prices: Vec::new(),
        }
    }
}

// =============================================================================
// Article
// =============================================================================

/// A catalog article.
///
/// The classification fields (`precode`, `family`, `classifications`,
/// `category`) are the match keys consumed by discount-grid rules and
/// promotion applicability filters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: Uuid,
    pub code: String,
    pub description: String,
    /// Manufacturer prefix code ("precodice").
    pub precode: Option<String>,
    /// Product family.
    pub family: Option<String>,
    /// Free-form classification tags.
    pub classifications: Vec<String>,
    /// Merchandising category.
    pub category: Option<String>,
    pub barcodes: Vec<String>,
    pub stock: StockInfo,
    pub pricing: PricingInfo,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Article {
    /// Creates a new active article with empty stock and default pricing.
    ///
    /// Codes are stored uppercase and trimmed.
    pub fn new(code: &str, description: &str) -> CoreResult<Self> {
        validate_code(code)?;
        validate_name(description)?;

        let now = Utc::now();
        Ok(Article {
            id: Uuid::new_v4(),
            code: code.trim().to_uppercase(),
            description: description.trim().to_string(),
            precode: None,
            family: None,
            classifications: Vec::new(),
            category: None,
            barcodes: Vec::new(),
            stock: StockInfo::default(),
            pricing: PricingInfo::default(),
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// Checks cross-field invariants.
    pub fn validate(&self) -> CoreResult<()> {
        validate_code(&self.code)?;
        if self.pricing.list_price.is_negative() {
            return Err(ValidationError::OutOfRange {
                field: "list_price".to_string(),
                min: 0,
                max: i64::MAX,
            }
            .into());
        }
        if self.stock.on_hand < 0 {
            return Err(ValidationError::OutOfRange {
                field: "on_hand".to_string(),
                min: 0,
                max: i64::MAX,
            }
            .into());
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Barcodes
    // -------------------------------------------------------------------------

    /// Adds a barcode, rejecting duplicates.
    pub fn add_barcode(&mut self, barcode: &str) -> CoreResult<()> {
        let barcode = barcode.trim();
        if barcode.is_empty() {
            return Err(ValidationError::Required {
                field: "barcode".to_string(),
            }
            .into());
        }
        if self.barcodes.iter().any(|b| b == barcode) {
            return Err(ValidationError::InvalidFormat {
                field: "barcode".to_string(),
                reason: format!("'{barcode}' already present"),
            }
            .into());
        }
        self.barcodes.push(barcode.to_string());
        self.touch();
        Ok(())
    }

    /// Removes a barcode if present.
    pub fn remove_barcode(&mut self, barcode: &str) {
        let before = self.barcodes.len();
        self.barcodes.retain(|b| b != barcode);
        if self.barcodes.len() != before {
            self.touch();
        }
    }

    // -------------------------------------------------------------------------
    // Stock Operations
    // -------------------------------------------------------------------------

    /// Adds received stock.
    pub fn add_stock(&mut self, quantity: i64) -> CoreResult<()> {
        if quantity <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            }
            .into());
        }
        self.stock.on_hand += quantity;
        let now = Utc::now();
        self.stock.last_restock = Some(now);
        self.stock.last_movement = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Removes sold/consumed stock from available units.
    pub fn remove_stock(&mut self, quantity: i64) -> CoreResult<()> {
        if quantity <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            }
            .into());
        }
        if self.stock.available() < quantity {
            return Err(CoreError::InsufficientStock {
                code: self.code.clone(),
                available: self.stock.available(),
                requested: quantity,
            });
        }
        self.stock.on_hand -= quantity;
        let now = Utc::now();
        self.stock.last_movement = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Reserves available stock for an open order.
    pub fn reserve_stock(&mut self, quantity: i64) -> CoreResult<()> {
        if quantity <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            }
            .into());
        }
        if self.stock.available() < quantity {
            return Err(CoreError::InsufficientStock {
                code: self.code.clone(),
                available: self.stock.available(),
                requested: quantity,
            });
        }
        self.stock.reserved += quantity;
        self.touch();
        Ok(())
    }

    /// Releases previously reserved stock back to available.
    pub fn release_reserved(&mut self, quantity: i64) -> CoreResult<()> {
        if quantity <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            }
            .into());
        }
        if self.stock.reserved < quantity {
            return Err(CoreError::ReleaseExceedsReserved {
                code: self.code.clone(),
                reserved: self.stock.reserved,
                requested: quantity,
            });
        }
        self.stock.reserved -= quantity;
        self.touch();
        Ok(())
    }

    /// True when available stock has fallen to the reorder point.
    pub fn is_low_stock(&self) -> bool {
        self.stock.available() <= self.stock.reorder_point
    }

    // -------------------------------------------------------------------------
    // Margins
    // -------------------------------------------------------------------------

    /// Gross margin on a selling price, as a percentage of that price.
    ///
    /// Returns `None` when no purchase cost is known.
    pub fn margin_percent(&self, selling_price: Money) -> Option<f64> {
        let cost = self.pricing.last_purchase_cost?;
        if selling_price.is_zero() {
            return Some(0.0);
        }
        Some((selling_price - cost).cents() as f64 / selling_price.cents() as f64 * 100.0)
    }

    /// Sottocosto guard: true when the margin falls below the threshold.
    ///
    /// An article with no known cost is never flagged.
    pub fn is_sottocosto(&self, selling_price: Money, threshold_percent: f64) -> bool {
        match self.margin_percent(selling_price) {
            Some(margin) => margin < threshold_percent,
            None => false,
        }
    }

    // -------------------------------------------------------------------------
    // Net Prices
    // -------------------------------------------------------------------------

    /// Adds or replaces the net price for a customer.
    pub fn add_net_price(&mut self, net_price: NetPrice) {
        match self
            .pricing
            .net_prices
            .iter_mut()
            .find(|np| np.customer_id == net_price.customer_id)
        {
            Some(existing) => *existing = net_price,
            None => self.pricing.net_prices.push(net_price),
        }
        self.touch();
    }

    /// Returns the net price valid for this customer at `now`, if any.
    ///
    /// An expired or not-yet-started override is skipped; the caller falls
    /// back to the list price.
    pub fn net_price_for(&self, customer_id: Uuid, now: DateTime<Utc>) -> Option<&NetPrice> {
        self.pricing
            .net_prices
            .iter()
            .find(|np| np.customer_id == customer_id && np.window.contains(now))
    }

    /// All net prices whose validity has ended as of `now`.
    pub fn expired_net_prices(&self, now: DateTime<Utc>) -> Vec<&NetPrice> {
        self.pricing
            .net_prices
            .iter()
            .filter(|np| np.window.is_expired(now))
            .collect()
    }

    /// The unit base price for a customer: net override when valid, else list.
    pub fn base_price_for(&self, customer_id: Uuid, now: DateTime<Utc>) -> Money {
        self.net_price_for(customer_id, now)
            .map(|np| np.price)
            .unwrap_or(self.pricing.list_price)
    }

    /// Margin check with the quoted price, using a rate threshold.
    pub fn below_margin(&self, selling_price: Money, threshold: DiscountRate) -> bool {
        self.is_sottocosto(selling_price, threshold.percentage())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn article_with_stock(on_hand: i64, reserved: i64) -> Article {
        let mut a = Article::new("FLT-OIL-01", "Filtro olio motore").unwrap();
        a.stock.on_hand = on_hand;
        a.stock.reserved = reserved;
        a
    }

    #[test]
    fn test_new_normalizes_code() {
        let a = Article::new(" flt-oil-01 ", "Filtro olio").unwrap();
        assert_eq!(a.code, "FLT-OIL-01");
        assert!(a.is_active);
    }

    #[test]
    fn test_available_is_derived() {
        let a = article_with_stock(20, 6);
        assert_eq!(a.stock.available(), 14);
    }

    #[test]
    fn test_reserve_respects_available() {
        let mut a = article_with_stock(10, 8);
        assert!(a.reserve_stock(2).is_ok());
        assert_eq!(a.stock.available(), 0);

        let err = a.reserve_stock(1).unwrap_err();
        assert!(matches!(err, CoreError::InsufficientStock { .. }));
    }

    #[test]
    fn test_release_cannot_exceed_reserved() {
        let mut a = article_with_stock(10, 3);
        assert!(a.release_reserved(3).is_ok());
        assert_eq!(a.stock.reserved, 0);

        let err = a.release_reserved(1).unwrap_err();
        assert!(matches!(err, CoreError::ReleaseExceedsReserved { .. }));
    }

    #[test]
    fn test_remove_stock_checks_available_not_on_hand() {
        // 10 on hand but 8 reserved: only 2 can be removed.
        let mut a = article_with_stock(10, 8);
        assert!(a.remove_stock(3).is_err());
        assert!(a.remove_stock(2).is_ok());
        assert_eq!(a.stock.on_hand, 8);
    }

    #[test]
    fn test_duplicate_barcode_rejected() {
        let mut a = article_with_stock(0, 0);
        a.add_barcode("8001234567890").unwrap();
        assert!(a.add_barcode("8001234567890").is_err());
        a.remove_barcode("8001234567890");
        assert!(a.barcodes.is_empty());
    }

    #[test]
    fn test_net_price_valid_window() {
        let customer = Uuid::new_v4();
        let now = Utc::now();
        let mut a = article_with_stock(0, 0);
        a.pricing.list_price = Money::from_cents(10_000);
        a.add_net_price(NetPrice {
            customer_id: customer,
            price: Money::from_cents(8_500),
            window: ValidityWindow::between(now - Duration::days(1), now + Duration::days(1)),
        });

        assert_eq!(a.base_price_for(customer, now).cents(), 8_500);
        // Another customer gets the list price.
        assert_eq!(a.base_price_for(Uuid::new_v4(), now).cents(), 10_000);
    }

    #[test]
    fn test_expired_net_price_falls_back_to_list() {
        let customer = Uuid::new_v4();
        let now = Utc::now();
        let mut a = article_with_stock(0, 0);
        a.pricing.list_price = Money::from_cents(10_000);
        a.add_net_price(NetPrice {
            customer_id: customer,
            price: Money::from_cents(8_500),
            window: ValidityWindow::between(now - Duration::days(30), now - Duration::days(1)),
        });

        assert!(a.net_price_for(customer, now).is_none());
        assert_eq!(a.base_price_for(customer, now).cents(), 10_000);
        assert_eq!(a.expired_net_prices(now).len(), 1);
    }

    #[test]
    fn test_add_net_price_replaces_per_customer() {
        let customer = Uuid::new_v4();
        let mut a = article_with_stock(0, 0);
        a.add_net_price(NetPrice {
            customer_id: customer,
            price: Money::from_cents(9_000),
            window: ValidityWindow::unbounded(),
        });
        a.add_net_price(NetPrice {
            customer_id: customer,
            price: Money::from_cents(8_000),
            window: ValidityWindow::unbounded(),
        });

        assert_eq!(a.pricing.net_prices.len(), 1);
        assert_eq!(a.pricing.net_prices[0].price.cents(), 8_000);
    }

    #[test]
    fn test_sottocosto() {
        let mut a = article_with_stock(0, 0);
        a.pricing.last_purchase_cost = Some(Money::from_cents(8_000));

        // Selling at €100.00 with €80.00 cost → 20% margin.
        assert!(!a.is_sottocosto(Money::from_cents(10_000), 15.0));
        assert!(a.is_sottocosto(Money::from_cents(9_000), 15.0));

        // No known cost: never flagged.
        a.pricing.last_purchase_cost = None;
        assert!(!a.is_sottocosto(Money::from_cents(100), 15.0));
    }

    #[test]
    fn test_low_stock() {
        let mut a = article_with_stock(10, 8);
        a.stock.reorder_point = 3;
        assert!(a.is_low_stock()); // available 2 <= 3

        a.stock.reserved = 0;
        assert!(!a.is_low_stock()); // available 10 > 3
    }
}
