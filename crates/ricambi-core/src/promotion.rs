//! # Promotions
//!
//! Promotional campaigns: what they apply to, who may use them, how much
//! they discount, and the usage bookkeeping that caps them.
//!
//! ## Applicability Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Is this promotion usable right now?                     │
//! │                                                                         │
//! │  is_valid(now)          active + inside validity window                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  applies_to_article     excluded codes first (hard veto), then the      │
//! │       │                 FIRST non-empty list among codes, precodes,     │
//! │       │                 families, classifications, categories decides   │
//! │       │                 exclusively. All lists empty = universal.       │
//! │       ▼                                                                 │
//! │  applies_to_customer    explicit customer list, else category list,     │
//! │       │                 else universal                                  │
//! │       ▼                                                                 │
//! │  can_be_used            usage caps and min/max conditions; first        │
//! │                         failing check wins                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage statistics only grow through [`Promotion::record_usage`];
//! [`Promotion::reset_daily_usage`] is the single operation that zeroes the
//! daily counter and is scheduled externally at the day boundary.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::article::Article;
use crate::customer::Customer;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{CustomerCategory, DiscountRate, ValidityWindow};
use crate::validation::{validate_code, validate_name, validate_range, validate_rate_bps};

// =============================================================================
// Promotion Kind
// =============================================================================

/// What a promotion grants, one variant per mechanic.
///
/// Each variant carries only the fields its mechanic needs, so a percent
/// promotion can never be created with stray bundle fields populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum PromotionKind {
    /// Percentage off the line total.
    PercentDiscount { rate: DiscountRate },
    /// Every unit sold at a fixed promotional price.
    FixedPrice { price: Money },
    /// Buy `buy_quantity`, get `get_quantity` free.
    BuyNGetM { buy_quantity: i64, get_quantity: i64 },
    /// A set of articles sold together at a bundle price.
    Bundle {
        article_codes: Vec<String>,
        bundle_price: Money,
    },
    /// Waives shipping costs on the order.
    FreeShipping,
}

impl PromotionKind {
    /// Total line discount for `quantity` units at `base_price` each.
    ///
    /// Returns `None` for mechanics this path cannot price (bundles span
    /// multiple lines, free shipping is not a line discount). Such
    /// promotions are skipped by best-promotion selection rather than
    /// winning with a silent zero.
    pub fn discount(&self, base_price: Money, quantity: i64) -> Option<Money> {
        match self {
            PromotionKind::PercentDiscount { rate } => {
                Some(base_price.multiply_quantity(quantity).discount_part(*rate))
            }
            PromotionKind::FixedPrice { price } => {
                let per_unit = base_price - *price;
                if per_unit.is_positive() {
                    Some(per_unit.multiply_quantity(quantity))
                } else {
                    Some(Money::zero())
                }
            }
            PromotionKind::BuyNGetM {
                buy_quantity,
                get_quantity,
            } => {
                if *buy_quantity <= 0 {
                    return Some(Money::zero());
                }
                let free_units = (quantity / buy_quantity) * get_quantity;
                Some(base_price.multiply_quantity(free_units))
            }
            PromotionKind::Bundle { .. } | PromotionKind::FreeShipping => None,
        }
    }

    fn validate(&self) -> CoreResult<()> {
        match self {
            PromotionKind::PercentDiscount { rate } => {
                validate_rate_bps(rate.bps())?;
                Ok(())
            }
            PromotionKind::FixedPrice { price } => {
                if price.is_negative() {
                    return Err(CoreError::InvalidPromotionRule {
                        reason: "fixed price cannot be negative".to_string(),
                    });
                }
                Ok(())
            }
            PromotionKind::BuyNGetM {
                buy_quantity,
                get_quantity,
            } => {
                if *buy_quantity <= 0 || *get_quantity <= 0 {
                    return Err(CoreError::InvalidPromotionRule {
                        reason: "buy and get quantities must be positive".to_string(),
                    });
                }
                Ok(())
            }
            PromotionKind::Bundle {
                article_codes,
                bundle_price,
            } => {
                if article_codes.len() < 2 {
                    return Err(CoreError::InvalidPromotionRule {
                        reason: "bundle must reference at least 2 articles".to_string(),
                    });
                }
                if !bundle_price.is_positive() {
                    return Err(CoreError::InvalidPromotionRule {
                        reason: "bundle price must be positive".to_string(),
                    });
                }
                Ok(())
            }
            PromotionKind::FreeShipping => Ok(()),
        }
    }
}

// =============================================================================
// Applicability Filters
// =============================================================================

/// Which articles a promotion covers.
///
/// Evaluation is an explicit ordered chain: the excluded-codes list is a
/// hard veto, then the first non-empty list among codes, precodes,
/// families, classifications, categories is exclusively authoritative. A
/// miss on that list never falls through to the next one. All lists empty
/// means the promotion covers every article.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArticleFilter {
    pub excluded_codes: Vec<String>,
    pub codes: Vec<String>,
    pub precodes: Vec<String>,
    pub families: Vec<String>,
    pub classifications: Vec<String>,
    pub categories: Vec<String>,
}

impl ArticleFilter {
    /// A filter matching every article.
    pub fn universal() -> Self {
        ArticleFilter::default()
    }

    pub fn matches(&self, article: &Article) -> bool {
        if self.excluded_codes.iter().any(|c| *c == article.code) {
            return false;
        }

        if !self.codes.is_empty() {
            return self.codes.iter().any(|c| *c == article.code);
        }
        if !self.precodes.is_empty() {
            return match &article.precode {
                Some(precode) => self.precodes.iter().any(|p| p == precode),
                None => false,
            };
        }
        if !self.families.is_empty() {
            return match &article.family {
                Some(family) => self.families.iter().any(|f| f == family),
                None => false,
            };
        }
        if !self.classifications.is_empty() {
            return article
                .classifications
                .iter()
                .any(|tag| self.classifications.contains(tag));
        }
        if !self.categories.is_empty() {
            return match &article.category {
                Some(category) => self.categories.iter().any(|c| c == category),
                None => false,
            };
        }

        true
    }
}

/// Which customers a promotion covers.
///
/// A non-empty explicit customer list is authoritative; otherwise a
/// non-empty category list is; otherwise every customer qualifies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerFilter {
    pub customer_ids: Vec<Uuid>,
    pub categories: Vec<CustomerCategory>,
}

impl CustomerFilter {
    pub fn universal() -> Self {
        CustomerFilter::default()
    }

    pub fn matches(&self, customer: &Customer) -> bool {
        if !self.customer_ids.is_empty() {
            return self.customer_ids.contains(&customer.id);
        }
        if !self.categories.is_empty() {
            return self.categories.contains(&customer.category);
        }
        true
    }
}

// =============================================================================
// Conditions, Limits, Statistics
// =============================================================================

/// Numeric preconditions on the requested line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageConditions {
    pub min_quantity: Option<i64>,
    pub max_quantity: Option<i64>,
    pub min_amount: Option<Money>,
    pub max_amount: Option<Money>,
}

/// Caps on how often the promotion may be redeemed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageLimits {
    pub max_usage_total: Option<u32>,
    pub max_usage_per_customer: Option<u32>,
    pub max_usage_per_day: Option<u32>,
}

/// Running redemption statistics. Counters only ever increase through
/// `record_usage`; the daily counter is zeroed only by `reset_daily_usage`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageStats {
    pub total_usages: u32,
    pub usages_today: u32,
    pub usages_by_customer: HashMap<Uuid, u32>,
    pub total_revenue: Money,
    pub total_discount: Money,
    pub last_used_at: Option<DateTime<Utc>>,
}

/// Why a promotion cannot be redeemed for a given request.
///
/// An expected business outcome, carried as a value. The first failing
/// check wins; violations are not aggregated.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UsageDenial {
    #[error("total usage limit reached")]
    TotalCapReached,
    #[error("usage limit for this customer reached")]
    CustomerCapReached,
    #[error("daily usage limit reached")]
    DailyCapReached,
    #[error("quantity below minimum of {min}")]
    QuantityBelowMinimum { min: i64 },
    #[error("quantity above maximum of {max}")]
    QuantityAboveMaximum { max: i64 },
    #[error("amount below minimum of {min}")]
    AmountBelowMinimum { min: Money },
    #[error("amount above maximum of {max}")]
    AmountAboveMaximum { max: Money },
}

// =============================================================================
// Promotion
// =============================================================================

/// A promotional campaign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Promotion {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub kind: PromotionKind,
    /// Display and query ordering only. Selection in the pricing path is
    /// by discount amount, never by priority.
    pub priority: i32,
    pub window: ValidityWindow,
    pub article_filter: ArticleFilter,
    pub customer_filter: CustomerFilter,
    pub conditions: UsageConditions,
    pub limits: UsageLimits,
    pub stats: UsageStats,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Promotion {
    /// Creates an active, universally applicable promotion with no caps.
    pub fn new(code: &str, name: &str, kind: PromotionKind) -> CoreResult<Self> {
        validate_code(code)?;
        validate_name(name)?;
        kind.validate()?;

        let now = Utc::now();
        Ok(Promotion {
            id: Uuid::new_v4(),
            code: code.trim().to_uppercase(),
            name: name.trim().to_string(),
            description: None,
            kind,
            priority: 0,
            window: ValidityWindow::unbounded(),
            article_filter: ArticleFilter::universal(),
            customer_filter: CustomerFilter::universal(),
            conditions: UsageConditions::default(),
            limits: UsageLimits::default(),
            stats: UsageStats::default(),
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// Cross-field consistency check, run before persisting edits.
    pub fn validate(&self) -> CoreResult<()> {
        validate_code(&self.code)?;
        validate_name(&self.name)?;
        self.kind.validate()?;

        if !self.window.is_ordered() {
            return Err(crate::error::ValidationError::InvalidWindow.into());
        }
        validate_range(
            "quantity",
            self.conditions.min_quantity,
            self.conditions.max_quantity,
        )?;
        validate_range(
            "amount",
            self.conditions.min_amount.map(|m| m.cents()),
            self.conditions.max_amount.map(|m| m.cents()),
        )?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Applicability
    // -------------------------------------------------------------------------

    /// Active and inside the validity window.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.window.contains(now)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.window.is_expired(now)
    }

    pub fn applies_to_article(&self, article: &Article) -> bool {
        self.article_filter.matches(article)
    }

    pub fn applies_to_customer(&self, customer: &Customer) -> bool {
        self.customer_filter.matches(customer)
    }

    /// Checks usage caps and numeric conditions for a redemption.
    ///
    /// Check order: total cap, per-customer cap, daily cap, min quantity,
    /// max quantity, min amount, max amount.
    pub fn can_be_used(
        &self,
        customer_id: Uuid,
        quantity: i64,
        amount: Money,
    ) -> Result<(), UsageDenial> {
        if let Some(max_total) = self.limits.max_usage_total {
            if self.stats.total_usages >= max_total {
                return Err(UsageDenial::TotalCapReached);
            }
        }
        if let Some(max_per_customer) = self.limits.max_usage_per_customer {
            let used = self
                .stats
                .usages_by_customer
                .get(&customer_id)
                .copied()
                .unwrap_or(0);
            if used >= max_per_customer {
                return Err(UsageDenial::CustomerCapReached);
            }
        }
        if let Some(max_per_day) = self.limits.max_usage_per_day {
            if self.stats.usages_today >= max_per_day {
                return Err(UsageDenial::DailyCapReached);
            }
        }

        if let Some(min) = self.conditions.min_quantity {
            if quantity < min {
                return Err(UsageDenial::QuantityBelowMinimum { min });
            }
        }
        if let Some(max) = self.conditions.max_quantity {
            if quantity > max {
                return Err(UsageDenial::QuantityAboveMaximum { max });
            }
        }
        if let Some(min) = self.conditions.min_amount {
            if amount < min {
                return Err(UsageDenial::AmountBelowMinimum { min });
            }
        }
        if let Some(max) = self.conditions.max_amount {
            if amount > max {
                return Err(UsageDenial::AmountAboveMaximum { max });
            }
        }

        Ok(())
    }

    /// Total line discount this promotion grants; see
    /// [`PromotionKind::discount`] for the `None` cases.
    pub fn discount(&self, base_price: Money, quantity: i64) -> Option<Money> {
        self.kind.discount(base_price, quantity)
    }

    // -------------------------------------------------------------------------
    // Usage Bookkeeping
    // -------------------------------------------------------------------------

    /// Records one redemption. Called by the sale-commit path only, never
    /// while quoting a price.
    pub fn record_usage(&mut self, customer_id: Uuid, revenue: Money, discount: Money) {
        self.stats.total_usages += 1;
        self.stats.usages_today += 1;
        *self.stats.usages_by_customer.entry(customer_id).or_insert(0) += 1;
        self.stats.total_revenue += revenue;
        self.stats.total_discount += discount;
        let now = Utc::now();
        self.stats.last_used_at = Some(now);
        self.updated_at = now;
    }

    /// Zeroes the daily counter. Scheduled once per day boundary by the
    /// surrounding service.
    pub fn reset_daily_usage(&mut self) {
        self.stats.usages_today = 0;
        self.updated_at = Utc::now();
    }

    pub fn activate(&mut self) {
        self.is_active = true;
        self.updated_at = Utc::now();
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.updated_at = Utc::now();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
