//! # Pricing Service
//!
//! Quotes line prices and commits sales.
//!
//! ## Quote vs Commit
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  quote(customer, article, qty)                                          │
//! │    load snapshots ──► calculate_final_price ──► DiscountCalculation     │
//! │    (pure: no counter moves, quotes are free)                            │
//! │                                                                         │
//! │  commit(calculation)                                                    │
//! │    sale is final ──► record usage on the winning promotion              │
//! │    (the only place promotion statistics move)                           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::StoreResult;
use crate::repository::article::ArticleRepository;
use crate::repository::customer::CustomerRepository;
use crate::repository::promotion::PromotionRepository;
use ricambi_core::customer::{PurchaseClearance, PurchaseDenied};
use ricambi_core::pricing::{calculate_final_price, DiscountCalculation};
use ricambi_core::Money;

/// Fido usage percentage that triggers a warning at the till.
pub const FIDO_WARNING_THRESHOLD: f64 = 90.0;
/// Fido usage percentage that blocks the sale.
pub const FIDO_BLOCK_THRESHOLD: f64 = 100.0;

/// Coordinates customer, article and promotion data into priced lines.
#[derive(Debug, Clone)]
pub struct PricingService {
    articles: ArticleRepository,
    customers: CustomerRepository,
    promotions: PromotionRepository,
}

impl PricingService {
    pub fn new(
        articles: ArticleRepository,
        customers: CustomerRepository,
        promotions: PromotionRepository,
    ) -> Self {
        PricingService {
            articles,
            customers,
            promotions,
        }
    }

    /// Prices one line as of now.
    pub async fn quote(
        &self,
        customer_id: Uuid,
        article_id: Uuid,
        quantity: i64,
    ) -> StoreResult<DiscountCalculation> {
        self.quote_at(customer_id, article_id, quantity, Utc::now())
            .await
    }

    /// Prices one line as of an explicit instant.
    pub async fn quote_at(
        &self,
        customer_id: Uuid,
        article_id: Uuid,
        quantity: i64,
        now: DateTime<Utc>,
    ) -> StoreResult<DiscountCalculation> {
        let customer = self.customers.get_by_id(customer_id).await?;
        let article = self.articles.get_by_id(article_id).await?;
        let promotions = self.promotions.find_active(now).await;

        let calculation =
            calculate_final_price(&customer, &article, quantity, &promotions, now)?;
        debug!(
            article = %article.code,
            customer = %customer.code,
            final_price = %calculation.final_price,
            "line quoted"
        );
        Ok(calculation)
    }

    /// Credit check against the customer's fido before committing a sale.
    pub async fn check_credit(
        &self,
        customer_id: Uuid,
        amount: Money,
    ) -> StoreResult<Result<PurchaseClearance, PurchaseDenied>> {
        let customer = self.customers.get_by_id(customer_id).await?;
        Ok(customer.can_make_purchase(amount, FIDO_WARNING_THRESHOLD, FIDO_BLOCK_THRESHOLD))
    }

    /// Finalizes a sold line: records usage on the promotion that won the
    /// quote, if any. Call only once the sale is actually committed.
    pub async fn commit(&self, calculation: &DiscountCalculation) -> StoreResult<()> {
        if let Some(promotion_id) = calculation.applied_promotion {
            let total_discount = calculation
                .total_discount
                .multiply_quantity(calculation.quantity);
            self.promotions
                .record_usage(
                    promotion_id,
                    calculation.customer_id,
                    calculation.line_total,
                    total_discount,
                )
                .await?;
        }
        info!(
            customer_id = %calculation.customer_id,
            line_total = %calculation.line_total,
            "sale line committed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ricambi_core::promotion::PromotionKind;
    use ricambi_core::types::DiscountRate;
    use ricambi_core::{Article, Customer, Money, Promotion};

    async fn service_with_catalog() -> (PricingService, Uuid, Uuid, Uuid) {
        let articles = ArticleRepository::new();
        let customers = CustomerRepository::new();
        let promotions = PromotionRepository::new();

        let mut article = Article::new("FLT-OIL-01", "Filtro olio motore").unwrap();
        article.pricing.list_price = Money::from_cents(10_000);
        let article_id = article.id;
        articles.insert(article).await.unwrap();

        let customer = Customer::new("C001", "Officina Rossi").unwrap();
        let customer_id = customer.id;
        customers.insert(customer).await.unwrap();

        let promo = Promotion::new(
            "PROMO-10",
            "Sconto filtri",
            PromotionKind::PercentDiscount {
                rate: DiscountRate::from_bps(1000),
            },
        )
        .unwrap();
        let promo_id = promo.id;
        promotions.insert(promo).await.unwrap();

        (
            PricingService::new(articles, customers, promotions),
            customer_id,
            article_id,
            promo_id,
        )
    }

    #[tokio::test]
    async fn test_quote_applies_promotion() {
        let (service, customer_id, article_id, promo_id) = service_with_catalog().await;

        let calc = service.quote(customer_id, article_id, 2).await.unwrap();
        assert_eq!(calc.base_price.cents(), 10_000);
        assert_eq!(calc.promotion_discount.cents(), 1_000);
        assert_eq!(calc.final_price.cents(), 9_000);
        assert_eq!(calc.applied_promotion, Some(promo_id));
    }

    #[tokio::test]
    async fn test_quotes_do_not_consume_usage() {
        let (service, customer_id, article_id, promo_id) = service_with_catalog().await;

        for _ in 0..5 {
            service.quote(customer_id, article_id, 1).await.unwrap();
        }
        let promo = service.promotions.get_by_id(promo_id).await.unwrap();
        assert_eq!(promo.stats.total_usages, 0);
    }

    #[tokio::test]
    async fn test_commit_records_usage_once() {
        let (service, customer_id, article_id, promo_id) = service_with_catalog().await;

        let calc = service.quote(customer_id, article_id, 2).await.unwrap();
        service.commit(&calc).await.unwrap();

        let promo = service.promotions.get_by_id(promo_id).await.unwrap();
        assert_eq!(promo.stats.total_usages, 1);
        assert_eq!(promo.stats.usages_by_customer[&customer_id], 1);
        assert_eq!(promo.stats.total_revenue.cents(), 18_000);
        assert_eq!(promo.stats.total_discount.cents(), 2_000);
    }

    #[tokio::test]
    async fn test_commit_without_promotion_is_noop_on_stats() {
        let (service, customer_id, article_id, promo_id) = service_with_catalog().await;

        let mut calc = service.quote(customer_id, article_id, 1).await.unwrap();
        calc.applied_promotion = None;
        service.commit(&calc).await.unwrap();

        let promo = service.promotions.get_by_id(promo_id).await.unwrap();
        assert_eq!(promo.stats.total_usages, 0);
    }

    #[tokio::test]
    async fn test_check_credit_uses_fido() {
        let (service, customer_id, _, _) = service_with_catalog().await;

        let mut customer = service.customers.get_by_id(customer_id).await.unwrap();
        customer.credit.fido_limit = Money::from_cents(100_000);
        service.customers.update(customer).await.unwrap();

        let cleared = service
            .check_credit(customer_id, Money::from_cents(10_000))
            .await
            .unwrap();
        assert_eq!(cleared, Ok(PurchaseClearance::Ok));

        let denied = service
            .check_credit(customer_id, Money::from_cents(150_000))
            .await
            .unwrap();
        assert_eq!(denied, Err(PurchaseDenied::WouldExceedFido));
    }
}
