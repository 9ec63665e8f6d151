//! # Customer
//!
//! Customer accounts: credit ("fido") bookkeeping and the per-customer
//! discount grid consumed by the pricing calculator.
//!
//! ## Discount Grid Resolution
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │            find_applicable_discount(article, qty, now)                  │
//! │                                                                         │
//! │  For each rule:                                                         │
//! │    active? ── in window? ── min qty met? ── scope matches article?      │
//! │                                                                         │
//! │  Among matching rules the winner is chosen by:                          │
//! │    1. Scope specificity: ArticleCode > Precode > Family > Class.        │
//! │    2. Priority (higher wins) within the same specificity                │
//! │    3. First-seen on full ties                                           │
//! │                                                                         │
//! │  A rule carries exactly ONE scope: a code-scoped rule that does not     │
//! │  equal the article's code simply fails to match; it is never            │
//! │  re-tested against precode or family.                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::article::Article;
use crate::error::CoreResult;
use crate::money::Money;
use crate::types::{CustomerCategory, DiscountRate, ValidityWindow};
use crate::validation::{validate_cascade, validate_code, validate_name, validate_rate_bps};

// =============================================================================
// Credit ("Fido")
// =============================================================================

/// Credit standing of a customer.
///
/// `current_exposure` is the sum of unpaid invoices and open orders; the
/// fido limit is the maximum exposure the customer may carry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreditInfo {
    pub fido_limit: Money,
    pub current_exposure: Money,
    pub open_orders: Money,
    pub unpaid_invoices: Money,
    pub overdue_amount: Money,
    pub last_credit_check: Option<DateTime<Utc>>,
    pub block_sales: bool,
    pub block_reason: Option<String>,
}

/// Outcome of a successful credit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseClearance {
    /// Exposure stays comfortably inside the fido limit.
    Ok,
    /// Sale allowed, but the customer is approaching the fido limit.
    Warning,
}

/// Why a purchase was refused on credit grounds.
///
/// This is an expected business outcome, not a hard error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PurchaseDenied {
    #[error("customer is not active")]
    Inactive,
    #[error("sales blocked: {reason}")]
    Blocked { reason: String },
    #[error("purchase would exceed fido limit")]
    WouldExceedFido,
}

// =============================================================================
// Discount Rules
// =============================================================================

/// The single match key a discount rule applies to.
///
/// One rule, one scope. A rule never falls through to a weaker match key
/// when its own key misses, and carrying exactly one scope makes that
/// impossible to get wrong.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum RuleScope {
    /// Exact article code.
    ArticleCode(String),
    /// Manufacturer prefix code.
    Precode(String),
    /// Product family.
    Family(String),
    /// Any matching classification tag.
    Classification(String),
}

impl RuleScope {
    /// Whether this scope matches the article.
    pub fn matches(&self, article: &Article) -> bool {
        match self {
            RuleScope::ArticleCode(code) => article.code == *code,
            RuleScope::Precode(precode) => article.precode.as_deref() == Some(precode.as_str()),
            RuleScope::Family(family) => article.family.as_deref() == Some(family.as_str()),
            RuleScope::Classification(tag) => article.classifications.iter().any(|c| c == tag),
        }
    }

    /// Match specificity, higher is more specific.
    ///
    /// Compared before priority when choosing among matching rules.
    pub const fn specificity(&self) -> u8 {
        match self {
            RuleScope::ArticleCode(_) => 3,
            RuleScope::Precode(_) => 2,
            RuleScope::Family(_) => 1,
            RuleScope::Classification(_) => 0,
        }
    }
}

/// The reduction a discount rule grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleDiscount {
    /// One percentage applied once.
    Single(DiscountRate),
    /// Sequential percentages, each applied to the output of the previous.
    Cascade(Vec<DiscountRate>),
}

impl RuleDiscount {
    /// The discounted unit price.
    pub fn apply(&self, base: Money) -> Money {
        match self {
            RuleDiscount::Single(rate) => base.apply_discount(*rate),
            RuleDiscount::Cascade(steps) => base.apply_cascade(steps),
        }
    }

    /// The absolute per-unit discount amount.
    ///
    /// Cascades are converted to their equivalent absolute amount here so
    /// they compare correctly against per-unit promotion discounts.
    pub fn amount(&self, base: Money) -> Money {
        base - self.apply(base)
    }
}

/// One entry of a customer's discount grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountRule {
    pub id: Uuid,
    pub priority: i32,
    pub scope: RuleScope,
    pub discount: RuleDiscount,
    /// Minimum line quantity for the rule to apply. `None` = no minimum.
    pub min_quantity: Option<i64>,
    pub window: ValidityWindow,
    pub is_active: bool,
}

impl DiscountRule {
    /// Creates an active, unbounded rule.
    pub fn new(scope: RuleScope, discount: RuleDiscount, priority: i32) -> Self {
        DiscountRule {
            id: Uuid::new_v4(),
            priority,
            scope,
            discount,
            min_quantity: None,
            window: ValidityWindow::unbounded(),
            is_active: true,
        }
    }

    /// Whether this rule can apply to the request at all.
    fn is_candidate(&self, quantity: i64, now: DateTime<Utc>) -> bool {
        if !self.is_active {
            return false;
        }
        if !self.window.contains(now) {
            return false;
        }
        if let Some(min) = self.min_quantity {
            if quantity < min {
                return false;
            }
        }
        true
    }

    /// Absolute per-unit discount granted on a base price.
    pub fn discount_amount(&self, base: Money) -> Money {
        self.discount.amount(base)
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub code: String,
    pub company_name: String,
    pub vat_number: Option<String>,
    pub category: CustomerCategory,
    pub credit: CreditInfo,
    pub discount_grid: Vec<DiscountRule>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// Creates an active retail customer with an empty discount grid.
    pub fn new(code: &str, company_name: &str) -> CoreResult<Self> {
        validate_code(code)?;
        validate_name(company_name)?;

        let now = Utc::now();
        Ok(Customer {
            id: Uuid::new_v4(),
            code: code.trim().to_uppercase(),
            company_name: company_name.trim().to_string(),
            vat_number: None,
            category: CustomerCategory::default(),
            credit: CreditInfo::default(),
            discount_grid: Vec::new(),
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    // -------------------------------------------------------------------------
    // Credit
    // -------------------------------------------------------------------------

    /// Refreshes exposure from the accounting figures.
    pub fn update_exposure(&mut self, unpaid_invoices: Money, open_orders: Money) {
        self.credit.unpaid_invoices = unpaid_invoices;
        self.credit.open_orders = open_orders;
        self.credit.current_exposure = unpaid_invoices + open_orders;
        let now = Utc::now();
        self.credit.last_credit_check = Some(now);
        self.updated_at = now;
    }

    /// Exposure as a percentage of the fido limit (0 when no limit set).
    pub fn fido_usage_percent(&self) -> f64 {
        if self.credit.fido_limit.is_zero() {
            return 0.0;
        }
        self.credit.current_exposure.cents() as f64 / self.credit.fido_limit.cents() as f64 * 100.0
    }

    /// Credit headroom left, floored at zero.
    pub fn available_fido(&self) -> Money {
        let available = self.credit.fido_limit - self.credit.current_exposure;
        if available.is_negative() {
            Money::zero()
        } else {
            available
        }
    }

    /// Whether any overdue amount is outstanding.
    pub fn has_overdue_payments(&self) -> bool {
        self.credit.overdue_amount.is_positive()
    }

    /// Blocks all sales to this customer with a reason.
    pub fn block_sales(&mut self, reason: &str) {
        self.credit.block_sales = true;
        self.credit.block_reason = Some(reason.to_string());
        self.updated_at = Utc::now();
    }

    /// Lifts a sales block.
    pub fn unblock_sales(&mut self) {
        self.credit.block_sales = false;
        self.credit.block_reason = None;
        self.updated_at = Utc::now();
    }

    /// Credit check before committing a sale.
    ///
    /// Thresholds are percentages of the fido limit. A zero fido limit
    /// grants no credit: any purchase that leaves exposure above zero is
    /// refused.
    pub fn can_make_purchase(
        &self,
        amount: Money,
        warning_threshold: f64,
        block_threshold: f64,
    ) -> Result<PurchaseClearance, PurchaseDenied> {
        if !self.is_active {
            return Err(PurchaseDenied::Inactive);
        }

        if self.credit.block_sales {
            return Err(PurchaseDenied::Blocked {
                reason: self
                    .credit
                    .block_reason
                    .clone()
                    .unwrap_or_else(|| "sales blocked".to_string()),
            });
        }

        let new_exposure = self.credit.current_exposure + amount;

        if self.credit.fido_limit.is_zero() {
            if new_exposure.is_positive() {
                return Err(PurchaseDenied::WouldExceedFido);
            }
            return Ok(PurchaseClearance::Ok);
        }

        let new_usage =
            new_exposure.cents() as f64 / self.credit.fido_limit.cents() as f64 * 100.0;

        if new_usage >= block_threshold {
            return Err(PurchaseDenied::WouldExceedFido);
        }
        if new_usage >= warning_threshold {
            return Ok(PurchaseClearance::Warning);
        }
        Ok(PurchaseClearance::Ok)
    }

    // -------------------------------------------------------------------------
    // Discount Grid
    // -------------------------------------------------------------------------

    /// Adds a rule after validating its percentages.
    pub fn add_discount_rule(&mut self, rule: DiscountRule) -> CoreResult<()> {
        match &rule.discount {
            RuleDiscount::Single(rate) => validate_rate_bps(rate.bps())?,
            RuleDiscount::Cascade(steps) => validate_cascade(steps)?,
        }
        self.discount_grid.push(rule);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Removes a rule by id; unknown ids are ignored.
    pub fn remove_discount_rule(&mut self, rule_id: Uuid) {
        let before = self.discount_grid.len();
        self.discount_grid.retain(|r| r.id != rule_id);
        if self.discount_grid.len() != before {
            self.updated_at = Utc::now();
        }
    }

    /// Selects the single best-matching, currently-valid discount rule for
    /// an (article, quantity) request.
    ///
    /// Winner by scope specificity, then priority, then first-seen.
    pub fn find_applicable_discount(
        &self,
        article: &Article,
        quantity: i64,
        now: DateTime<Utc>,
    ) -> Option<&DiscountRule> {
        let mut best: Option<&DiscountRule> = None;

        for rule in &self.discount_grid {
            if !rule.is_candidate(quantity, now) {
                continue;
            }
            if !rule.scope.matches(article) {
                continue;
            }

            // Strict comparisons keep the first-seen rule on ties.
            best = match best {
                None => Some(rule),
                Some(current) => {
                    let candidate = (rule.scope.specificity(), rule.priority);
                    let incumbent = (current.scope.specificity(), current.priority);
                    if candidate > incumbent {
                        Some(rule)
                    } else {
                        Some(current)
                    }
                }
            };
        }

        best
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn test_article() -> Article {
        let mut a = Article::new("FLT-OIL-01", "Filtro olio motore").unwrap();
        a.precode = Some("FLT".to_string());
        a.family = Some("FILTRI".to_string());
        a.classifications = vec!["MOTORE".to_string(), "CONSUMABILI".to_string()];
        a
    }

    fn single(bps: u32) -> RuleDiscount {
        RuleDiscount::Single(DiscountRate::from_bps(bps))
    }

    #[test]
    fn test_scope_matching_has_no_fallthrough() {
        let article = test_article();

        // A code-scoped rule for another article never matches, even though
        // the precode/family would.
        let wrong_code = RuleScope::ArticleCode("FLT-AIR-02".to_string());
        assert!(!wrong_code.matches(&article));

        assert!(RuleScope::ArticleCode("FLT-OIL-01".to_string()).matches(&article));
        assert!(RuleScope::Precode("FLT".to_string()).matches(&article));
        assert!(RuleScope::Family("FILTRI".to_string()).matches(&article));
        assert!(RuleScope::Classification("MOTORE".to_string()).matches(&article));
        assert!(!RuleScope::Classification("CARROZZERIA".to_string()).matches(&article));
    }

    #[test]
    fn test_code_scope_beats_higher_priority_family() {
        let article = test_article();
        let mut customer = Customer::new("C001", "Officina Rossi").unwrap();

        let code_rule = DiscountRule::new(
            RuleScope::ArticleCode("FLT-OIL-01".to_string()),
            single(1000),
            1,
        );
        let code_rule_id = code_rule.id;
        let family_rule = DiscountRule::new(
            RuleScope::Family("FILTRI".to_string()),
            single(2000),
            99, // higher priority, less specific
        );

        customer.add_discount_rule(family_rule).unwrap();
        customer.add_discount_rule(code_rule).unwrap();

        let winner = customer
            .find_applicable_discount(&article, 1, Utc::now())
            .unwrap();
        assert_eq!(winner.id, code_rule_id);
    }

    #[test]
    fn test_priority_breaks_ties_within_specificity() {
        let article = test_article();
        let mut customer = Customer::new("C001", "Officina Rossi").unwrap();

        let low = DiscountRule::new(RuleScope::Family("FILTRI".to_string()), single(500), 1);
        let high = DiscountRule::new(RuleScope::Family("FILTRI".to_string()), single(1500), 5);
        let high_id = high.id;

        customer.add_discount_rule(low).unwrap();
        customer.add_discount_rule(high).unwrap();

        let winner = customer
            .find_applicable_discount(&article, 1, Utc::now())
            .unwrap();
        assert_eq!(winner.id, high_id);
    }

    #[test]
    fn test_equal_rules_first_seen_wins() {
        let article = test_article();
        let mut customer = Customer::new("C001", "Officina Rossi").unwrap();

        let first = DiscountRule::new(RuleScope::Family("FILTRI".to_string()), single(500), 5);
        let first_id = first.id;
        let second = DiscountRule::new(RuleScope::Family("FILTRI".to_string()), single(900), 5);

        customer.add_discount_rule(first).unwrap();
        customer.add_discount_rule(second).unwrap();

        let winner = customer
            .find_applicable_discount(&article, 1, Utc::now())
            .unwrap();
        assert_eq!(winner.id, first_id);
    }

    #[test]
    fn test_min_quantity_and_window_filters() {
        let article = test_article();
        let now = Utc::now();
        let mut customer = Customer::new("C001", "Officina Rossi").unwrap();

        let mut bulk_rule =
            DiscountRule::new(RuleScope::Family("FILTRI".to_string()), single(1000), 1);
        bulk_rule.min_quantity = Some(10);

        let mut expired_rule =
            DiscountRule::new(RuleScope::Family("FILTRI".to_string()), single(2000), 2);
        expired_rule.window =
            ValidityWindow::between(now - Duration::days(30), now - Duration::days(1));

        let mut inactive_rule =
            DiscountRule::new(RuleScope::Family("FILTRI".to_string()), single(3000), 3);
        inactive_rule.is_active = false;

        customer.add_discount_rule(bulk_rule).unwrap();
        customer.add_discount_rule(expired_rule).unwrap();
        customer.add_discount_rule(inactive_rule).unwrap();

        // Below the quantity threshold nothing applies.
        assert!(customer.find_applicable_discount(&article, 5, now).is_none());
        // At threshold the bulk rule kicks in.
        let winner = customer.find_applicable_discount(&article, 10, now).unwrap();
        assert_eq!(winner.min_quantity, Some(10));
    }

    #[test]
    fn test_cascade_discount_amount() {
        let base = Money::from_cents(10_000);
        let rule = DiscountRule::new(
            RuleScope::Family("FILTRI".to_string()),
            RuleDiscount::Cascade(vec![DiscountRate::from_bps(1000), DiscountRate::from_bps(1000)]),
            1,
        );

        // 100 × 0.9 × 0.9 = 81 → absolute discount 19.00, not 20.00.
        assert_eq!(rule.discount_amount(base).cents(), 1_900);
    }

    #[test]
    fn test_add_rule_validates_rate() {
        let mut customer = Customer::new("C001", "Officina Rossi").unwrap();
        let bad = DiscountRule::new(
            RuleScope::Family("FILTRI".to_string()),
            single(20_000), // 200%
            1,
        );
        assert!(customer.add_discount_rule(bad).is_err());
        assert!(customer.discount_grid.is_empty());
    }

    #[test]
    fn test_fido_checks() {
        let mut customer = Customer::new("C001", "Officina Rossi").unwrap();
        customer.credit.fido_limit = Money::from_cents(500_000); // €5,000
        customer.update_exposure(Money::from_cents(300_000), Money::from_cents(100_000));

        assert_eq!(customer.credit.current_exposure.cents(), 400_000);
        assert!((customer.fido_usage_percent() - 80.0).abs() < 0.01);
        assert_eq!(customer.available_fido().cents(), 100_000);

        // €50 more → 81% → warning zone.
        assert_eq!(
            customer.can_make_purchase(Money::from_cents(5_000), 80.0, 100.0),
            Ok(PurchaseClearance::Warning)
        );
        // €1,500 more → 110% → blocked.
        assert_eq!(
            customer.can_make_purchase(Money::from_cents(150_000), 80.0, 100.0),
            Err(PurchaseDenied::WouldExceedFido)
        );
    }

    #[test]
    fn test_blocked_customer_denied_with_reason() {
        let mut customer = Customer::new("C001", "Officina Rossi").unwrap();
        customer.block_sales("insoluto scaduto");

        let denied = customer
            .can_make_purchase(Money::from_cents(100), 80.0, 100.0)
            .unwrap_err();
        assert_eq!(
            denied,
            PurchaseDenied::Blocked {
                reason: "insoluto scaduto".to_string()
            }
        );

        customer.unblock_sales();
        assert!(customer
            .can_make_purchase(Money::from_cents(100), 80.0, 100.0)
            .is_err()); // zero fido limit grants no credit
    }
}
