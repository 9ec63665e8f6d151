//! # Promotion Repository
//!
//! Collection operations for promotional campaigns.
//!
//! ## Key Operations
//! - Active-set query for the pricing path, sorted by priority descending
//! - Usage recording under the collection write lock, so concurrent
//!   sale-commit paths cannot lose counter increments
//! - Daily usage reset across the whole collection

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::store::Collection;
use ricambi_core::{Money, Promotion};

/// Repository for promotion collection operations.
#[derive(Debug, Clone, Default)]
pub struct PromotionRepository {
    promotions: Collection<Promotion>,
}

impl PromotionRepository {
    pub fn new() -> Self {
        PromotionRepository {
            promotions: Collection::new(),
        }
    }

    /// Inserts a new promotion. Codes are unique.
    pub async fn insert(&self, promotion: Promotion) -> StoreResult<()> {
        promotion.validate()?;

        let mut promotions = self.promotions.write().await;
        if promotions.values().any(|p| p.code == promotion.code) {
            return Err(StoreError::duplicate("code", &promotion.code));
        }
        debug!(code = %promotion.code, "inserting promotion");
        promotions.insert(promotion.id, promotion);
        Ok(())
    }

    pub async fn get_by_id(&self, id: Uuid) -> StoreResult<Promotion> {
        self.promotions
            .get(id)
            .await
            .ok_or_else(|| StoreError::not_found("Promotion", id))
    }

    pub async fn get_by_code(&self, code: &str) -> StoreResult<Promotion> {
        let code = code.trim().to_uppercase();
        self.promotions
            .find(|p| p.code == code)
            .await
            .ok_or_else(|| StoreError::not_found("Promotion", code))
    }

    /// Replaces an existing promotion.
    pub async fn update(&self, promotion: Promotion) -> StoreResult<()> {
        promotion.validate()?;

        let mut promotions = self.promotions.write().await;
        if !promotions.contains_key(&promotion.id) {
            return Err(StoreError::not_found("Promotion", promotion.id));
        }
        debug!(code = %promotion.code, "updating promotion");
        promotions.insert(promotion.id, promotion);
        Ok(())
    }

    /// Promotions active as of `now`, sorted by priority descending.
    ///
    /// The ordering is for display and query consumers; best-promotion
    /// selection in the pricing path ignores priority.
    pub async fn find_active(&self, now: DateTime<Utc>) -> Vec<Promotion> {
        let mut active = self.promotions.filter(|p| p.is_valid(now)).await;
        active.sort_by(|a, b| b.priority.cmp(&a.priority));
        debug!(count = active.len(), "active promotions loaded");
        active
    }

    /// Records one redemption under the collection write lock.
    pub async fn record_usage(
        &self,
        id: Uuid,
        customer_id: Uuid,
        revenue: Money,
        discount: Money,
    ) -> StoreResult<()> {
        let mut promotions = self.promotions.write().await;
        let promotion = promotions
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("Promotion", id))?;
        promotion.record_usage(customer_id, revenue, discount);
        debug!(
            code = %promotion.code,
            total_usages = promotion.stats.total_usages,
            "promotion usage recorded"
        );
        Ok(())
    }

    /// Zeroes every promotion's daily counter. Run once per day boundary.
    pub async fn reset_daily_usage(&self) -> usize {
        let mut promotions = self.promotions.write().await;
        for promotion in promotions.values_mut() {
            promotion.reset_daily_usage();
        }
        promotions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ricambi_core::promotion::PromotionKind;
    use ricambi_core::types::{DiscountRate, ValidityWindow};
    use chrono::Duration;

    fn percent_promo(code: &str, priority: i32) -> Promotion {
        let mut p = Promotion::new(
            code,
            "Promo di prova",
            PromotionKind::PercentDiscount {
                rate: DiscountRate::from_bps(1000),
            },
        )
        .unwrap();
        p.priority = priority;
        p
    }

    #[tokio::test]
    async fn test_find_active_filters_and_sorts() {
        let now = Utc::now();
        let repo = PromotionRepository::new();

        let low = percent_promo("PROMO-A", 1);
        let high = percent_promo("PROMO-B", 10);
        let mut expired = percent_promo("PROMO-C", 99);
        expired.window =
            ValidityWindow::between(now - Duration::days(30), now - Duration::days(1));
        let mut inactive = percent_promo("PROMO-D", 99);
        inactive.deactivate();

        for p in [low, high, expired, inactive] {
            repo.insert(p).await.unwrap();
        }

        let active = repo.find_active(now).await;
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].code, "PROMO-B");
        assert_eq!(active[1].code, "PROMO-A");
    }

    #[tokio::test]
    async fn test_record_usage_and_daily_reset() {
        let repo = PromotionRepository::new();
        let promo = percent_promo("PROMO-A", 1);
        let id = promo.id;
        repo.insert(promo).await.unwrap();

        let customer = Uuid::new_v4();
        repo.record_usage(id, customer, Money::from_cents(9_000), Money::from_cents(1_000))
            .await
            .unwrap();

        let stored = repo.get_by_id(id).await.unwrap();
        assert_eq!(stored.stats.total_usages, 1);
        assert_eq!(stored.stats.usages_today, 1);

        repo.reset_daily_usage().await;
        let stored = repo.get_by_id(id).await.unwrap();
        assert_eq!(stored.stats.total_usages, 1);
        assert_eq!(stored.stats.usages_today, 0);
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected() {
        let repo = PromotionRepository::new();
        repo.insert(percent_promo("PROMO-A", 1)).await.unwrap();
        assert!(matches!(
            repo.insert(percent_promo("PROMO-A", 2)).await,
            Err(StoreError::Duplicate { .. })
        ));
    }
}
