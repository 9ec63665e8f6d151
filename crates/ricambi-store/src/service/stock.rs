//! # Stock Service
//!
//! Stock movements for single articles and whole kits.
//!
//! ## Atomic Kit Reservation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              reserve_kit(kit, quantity)                                 │
//! │                                                                         │
//! │  1. Take ONE write guard on the article collection                      │
//! │  2. Validate every component against it (all shortages reported)        │
//! │  3. Mutate every component under the SAME guard                         │
//! │                                                                         │
//! │  No other task can shrink availability between the check and the        │
//! │  reservation, and a failed call leaves every component untouched.       │
//! │  The operation is all-or-nothing to callers.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::{debug, info};
use uuid::Uuid;

use crate::error::StoreResult;
use crate::repository::article::ArticleRepository;
use crate::repository::kit::KitRepository;
use ricambi_core::{Article, Money};

/// Coordinates article and kit stock movements.
#[derive(Debug, Clone)]
pub struct StockService {
    articles: ArticleRepository,
    kits: KitRepository,
}

impl StockService {
    pub fn new(articles: ArticleRepository, kits: KitRepository) -> Self {
        StockService { articles, kits }
    }

    // -------------------------------------------------------------------------
    // Single Articles
    // -------------------------------------------------------------------------

    /// Books received goods into stock.
    pub async fn receive(&self, article_id: Uuid, quantity: i64) -> StoreResult<Article> {
        let article = self
            .articles
            .update_stock(article_id, |a| a.add_stock(quantity))
            .await?;
        info!(code = %article.code, quantity, "goods received");
        Ok(article)
    }

    /// Reserves stock for an open order.
    pub async fn reserve(&self, article_id: Uuid, quantity: i64) -> StoreResult<Article> {
        self.articles
            .update_stock(article_id, |a| a.reserve_stock(quantity))
            .await
    }

    /// Releases a reservation back to available.
    pub async fn release(&self, article_id: Uuid, quantity: i64) -> StoreResult<Article> {
        self.articles
            .update_stock(article_id, |a| a.release_reserved(quantity))
            .await
    }

    /// Consumes sold stock.
    pub async fn sell(&self, article_id: Uuid, quantity: i64) -> StoreResult<Article> {
        let article = self
            .articles
            .update_stock(article_id, |a| a.remove_stock(quantity))
            .await?;
        info!(code = %article.code, quantity, "stock sold");
        Ok(article)
    }

    // -------------------------------------------------------------------------
    // Kits
    // -------------------------------------------------------------------------

    /// Whole kits buildable from current component stock. Refreshes the
    /// kit's cached availability.
    pub async fn kit_availability(&self, kit_id: Uuid) -> StoreResult<i64> {
        let mut kit = self.kits.get_by_id(kit_id).await?;
        let component_ids: Vec<Uuid> = kit.components.iter().map(|c| c.article_id).collect();
        let snapshot = self.articles.get_by_ids(&component_ids).await;

        let available = kit.calculate_availability(&snapshot);
        self.kits.update(kit).await?;
        debug!(kit_id = %kit_id, available, "kit availability computed");
        Ok(available)
    }

    /// Current selling price of a kit. Refreshes the kit's cached price.
    pub async fn kit_price(&self, kit_id: Uuid) -> StoreResult<Money> {
        let mut kit = self.kits.get_by_id(kit_id).await?;
        let component_ids: Vec<Uuid> = kit.components.iter().map(|c| c.article_id).collect();
        let snapshot = self.articles.get_by_ids(&component_ids).await;

        let price = kit.calculate_price(&snapshot)?;
        self.kits.update(kit).await?;
        Ok(price)
    }

    /// Reserves component stock for `quantity` kits, all or nothing, under
    /// a single write guard on the article collection.
    pub async fn reserve_kit(&self, kit_id: Uuid, quantity: i64) -> StoreResult<()> {
        let kit = self.kits.get_by_id(kit_id).await?;
        let mut articles = self.articles.collection().write().await;
        kit.reserve_components(quantity, &mut articles)?;
        info!(code = %kit.code, quantity, "kit components reserved");
        Ok(())
    }

    /// Releases a kit reservation, all or nothing.
    pub async fn release_kit(&self, kit_id: Uuid, quantity: i64) -> StoreResult<()> {
        let kit = self.kits.get_by_id(kit_id).await?;
        let mut articles = self.articles.collection().write().await;
        kit.release_components(quantity, &mut articles)?;
        info!(code = %kit.code, quantity, "kit reservation released");
        Ok(())
    }

    /// Sells `quantity` kits: consumes component stock under one write
    /// guard, then persists the kit's updated sales figures.
    pub async fn sell_kit(&self, kit_id: Uuid, quantity: i64) -> StoreResult<()> {
        let mut kit = self.kits.get_by_id(kit_id).await?;
        {
            let mut articles = self.articles.collection().write().await;
            kit.decompose(quantity, &mut articles)?;
        }
        info!(code = %kit.code, quantity, sales_count = kit.sales_count, "kit sold");
        self.kits.update(kit).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ricambi_core::{CoreError, Kit, KitComponent};
    use crate::error::StoreError;

    async fn service_with_kit() -> (StockService, Uuid, Uuid, Uuid) {
        let articles = ArticleRepository::new();
        let kits = KitRepository::new();

        let mut a = ricambi_core::Article::new("FLT-OIL-01", "Filtro olio").unwrap();
        a.stock.on_hand = 10;
        a.pricing.list_price = Money::from_cents(1_000);
        let mut b = ricambi_core::Article::new("FLT-AIR-02", "Filtro aria").unwrap();
        b.stock.on_hand = 9;
        b.pricing.list_price = Money::from_cents(2_000);
        let a_id = a.id;
        let b_id = b.id;

        let components = vec![
            KitComponent::new(&a, 2).unwrap(),
            KitComponent::new(&b, 3).unwrap(),
        ];
        let kit = Kit::new("KIT-TAGLIANDO", "Kit tagliando completo", components).unwrap();
        let kit_id = kit.id;

        articles.insert(a).await.unwrap();
        articles.insert(b).await.unwrap();
        kits.insert(kit).await.unwrap();

        (StockService::new(articles, kits), kit_id, a_id, b_id)
    }

    #[tokio::test]
    async fn test_kit_availability_and_cache() {
        let (service, kit_id, _, _) = service_with_kit().await;

        assert_eq!(service.kit_availability(kit_id).await.unwrap(), 3);
        let kit = service.kits.get_by_id(kit_id).await.unwrap();
        assert_eq!(kit.cached_availability, Some(3));
    }

    #[tokio::test]
    async fn test_reserve_kit_moves_all_components() {
        let (service, kit_id, a_id, b_id) = service_with_kit().await;

        service.reserve_kit(kit_id, 2).await.unwrap();
        assert_eq!(service.articles.get_by_id(a_id).await.unwrap().stock.reserved, 4);
        assert_eq!(service.articles.get_by_id(b_id).await.unwrap().stock.reserved, 6);

        service.release_kit(kit_id, 2).await.unwrap();
        assert_eq!(service.articles.get_by_id(a_id).await.unwrap().stock.reserved, 0);
        assert_eq!(service.articles.get_by_id(b_id).await.unwrap().stock.reserved, 0);
    }

    #[tokio::test]
    async fn test_failed_kit_reservation_touches_nothing() {
        let (service, kit_id, a_id, b_id) = service_with_kit().await;

        let err = service.reserve_kit(kit_id, 4).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Core(CoreError::KitUnfulfillable { .. })
        ));
        assert_eq!(service.articles.get_by_id(a_id).await.unwrap().stock.reserved, 0);
        assert_eq!(service.articles.get_by_id(b_id).await.unwrap().stock.reserved, 0);
    }

    #[tokio::test]
    async fn test_sell_kit_consumes_stock_and_persists_counters() {
        let (service, kit_id, a_id, b_id) = service_with_kit().await;

        service.sell_kit(kit_id, 2).await.unwrap();
        assert_eq!(service.articles.get_by_id(a_id).await.unwrap().stock.on_hand, 6);
        assert_eq!(service.articles.get_by_id(b_id).await.unwrap().stock.on_hand, 3);

        let kit = service.kits.get_by_id(kit_id).await.unwrap();
        assert_eq!(kit.sales_count, 2);
        assert!(kit.last_sold.is_some());

        // Only one more kit fits in the remaining stock.
        assert_eq!(service.kit_availability(kit_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_kit_price_from_components() {
        let (service, kit_id, _, _) = service_with_kit().await;
        // 2 × €10.00 + 3 × €20.00 = €80.00
        assert_eq!(service.kit_price(kit_id).await.unwrap().cents(), 8_000);
    }

    #[tokio::test]
    async fn test_article_stock_roundtrip() {
        let (service, _, a_id, _) = service_with_kit().await;

        service.receive(a_id, 5).await.unwrap();
        service.reserve(a_id, 3).await.unwrap();
        let article = service.release(a_id, 3).await.unwrap();
        assert_eq!(article.stock.on_hand, 15);
        assert_eq!(article.stock.reserved, 0);

        let article = service.sell(a_id, 4).await.unwrap();
        assert_eq!(article.stock.on_hand, 11);
    }
}
