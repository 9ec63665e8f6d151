//! # Pricing Engine
//!
//! The orchestrator: combines net-price overrides, the customer discount
//! grid and promotional campaigns into one final price per line.
//!
//! ## Calculation Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │         calculate_final_price(customer, article, qty, promos, now)      │
//! │                                                                         │
//! │  1. Base price   = net-price override if valid, else list price         │
//! │  2. Promotion    = best usable promotion by absolute discount amount,   │
//! │                    normalized to a per-unit figure                      │
//! │  3. Grid rule    = best-matching discount rule, expressed as an         │
//! │                    absolute per-unit amount (cascades included)         │
//! │  4. MUTUAL EXCLUSION: customer discount and promotion are never         │
//! │     combined. The larger survives; the loser is zeroed and its          │
//! │     applied reference cleared. The grid rule wins exact ties.           │
//! │  5. Final price  = base − surviving discount                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The whole pipeline is a pure computation over caller-supplied snapshots:
//! no usage counter moves here. Recording promotion usage happens through
//! [`Promotion::record_usage`] only after a sale is committed, so quotes
//! that are never finalized cost nothing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::article::Article;
use crate::customer::Customer;
use crate::error::CoreResult;
use crate::money::Money;
use crate::promotion::Promotion;
use crate::validation::validate_quantity;

// =============================================================================
// Discount Calculation Result
// =============================================================================

/// The priced breakdown for one line, created fresh per query.
///
/// All monetary figures are per unit except `line_total`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountCalculation {
    pub article_id: Uuid,
    pub customer_id: Uuid,
    pub quantity: i64,
    /// Unit price after any net-price override, before discounts.
    pub base_price: Money,
    /// Per-unit discount from the customer's grid (zero if beaten).
    pub customer_discount: Money,
    /// Per-unit discount from the winning promotion (zero if beaten).
    pub promotion_discount: Money,
    /// Unit price after the surviving discount.
    pub final_price: Money,
    /// Per-unit total discount, derived for display.
    pub total_discount: Money,
    /// Effective discount as a percentage of the base price, for display.
    pub discount_percent: f64,
    pub line_total: Money,
    /// Grid rule that survived mutual exclusion, if any.
    pub applied_rule: Option<Uuid>,
    /// Promotion that survived mutual exclusion, if any.
    pub applied_promotion: Option<Uuid>,
}

// =============================================================================
// Promotion Selection
// =============================================================================

/// Picks the usable promotion with the strictly largest discount for this
/// request, first-seen on ties.
///
/// Promotions whose mechanic this path cannot price (bundles, free
/// shipping) are skipped rather than winning with a silent zero, as are
/// promotions whose discount comes out non-positive. The `priority` field
/// plays no part here.
pub fn find_best_promotion<'a>(
    promotions: &'a [Promotion],
    article: &Article,
    customer: &Customer,
    quantity: i64,
    base_price: Money,
    now: DateTime<Utc>,
) -> Option<(&'a Promotion, Money)> {
    let line_amount = base_price.multiply_quantity(quantity);
    let mut best: Option<(&Promotion, Money)> = None;

    for promotion in promotions {
        if !promotion.is_valid(now) {
            continue;
        }
        if !promotion.applies_to_article(article) {
            continue;
        }
        if !promotion.applies_to_customer(customer) {
            continue;
        }
        if promotion.can_be_used(customer.id, quantity, line_amount).is_err() {
            continue;
        }
        let discount = match promotion.discount(base_price, quantity) {
            Some(d) if d.is_positive() => d,
            _ => continue,
        };

        match best {
            Some((_, best_discount)) if discount <= best_discount => {}
            _ => best = Some((promotion, discount)),
        }
    }

    best
}

// =============================================================================
// Final Price Calculation
// =============================================================================

/// Prices one line for a customer.
///
/// `promotions` is the set of currently active promotions as supplied by
/// the repository layer. Pure over its inputs; mutates nothing.
pub fn calculate_final_price(
    customer: &Customer,
    article: &Article,
    quantity: i64,
    promotions: &[Promotion],
    now: DateTime<Utc>,
) -> CoreResult<DiscountCalculation> {
    validate_quantity(quantity)?;

    // 1. Net-price override, else list price.
    let base_price = article.base_price_for(customer.id, now);

    // 2. Best promotion against the already-adjusted base, normalized to a
    //    per-unit amount. Integer division may shed a remainder cent.
    let best_promotion = find_best_promotion(promotions, article, customer, quantity, base_price, now);
    let mut applied_promotion = best_promotion.map(|(p, _)| p.id);
    let mut promotion_discount = best_promotion
        .map(|(_, total)| Money::from_cents(total.cents() / quantity))
        .unwrap_or_else(Money::zero);

    // 3. Best grid rule, as an absolute per-unit amount so cascades compare
    //    against promotions on equal terms.
    let best_rule = customer.find_applicable_discount(article, quantity, now);
    let mut applied_rule = best_rule.map(|r| r.id);
    let mut customer_discount = best_rule
        .map(|r| r.discount_amount(base_price))
        .unwrap_or_else(Money::zero);

    // 4. Mutual exclusion: never both. The promotion must be strictly
    //    larger to displace the grid rule, so the rule wins exact ties.
    if customer_discount.is_positive() && promotion_discount.is_positive() {
        if promotion_discount > customer_discount {
            customer_discount = Money::zero();
            applied_rule = None;
        } else {
            promotion_discount = Money::zero();
            applied_promotion = None;
        }
    }

    // 5. Final price and display figures.
    let total_discount = customer_discount + promotion_discount;
    let final_price = base_price - total_discount;
    let discount_percent = if base_price.is_positive() {
        total_discount.cents() as f64 / base_price.cents() as f64 * 100.0
    } else {
        0.0
    };

    Ok(DiscountCalculation {
        article_id: article.id,
        customer_id: customer.id,
        quantity,
        base_price,
        customer_discount,
        promotion_discount,
        final_price,
        total_discount,
        discount_percent,
        line_total: final_price.multiply_quantity(quantity),
        applied_rule,
        applied_promotion,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
