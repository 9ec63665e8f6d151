//! # Article Repository
//!
//! Collection operations for catalog articles.
//!
//! ## Key Operations
//! - Lookup by id, code or barcode
//! - Batch snapshot for kit math
//! - Stock mutations under the collection lock

use std::collections::HashMap;

use tracing::debug;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::store::Collection;
use ricambi_core::Article;

/// Repository for article collection operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ArticleRepository::new();
/// repo.insert(article).await?;
/// let found = repo.get_by_code("FLT-OIL-01").await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ArticleRepository {
    articles: Collection<Article>,
}

impl ArticleRepository {
    pub fn new() -> Self {
        ArticleRepository {
            articles: Collection::new(),
        }
    }

    /// The underlying collection, for services that must mutate several
    /// articles under one write guard.
    pub fn collection(&self) -> &Collection<Article> {
        &self.articles
    }

    /// Inserts a new article. Codes are unique.
    pub async fn insert(&self, article: Article) -> StoreResult<()> {
        article.validate()?;

        let mut articles = self.articles.write().await;
        if articles.values().any(|a| a.code == article.code) {
            return Err(StoreError::duplicate("code", &article.code));
        }
        debug!(code = %article.code, "inserting article");
        articles.insert(article.id, article);
        Ok(())
    }

    pub async fn get_by_id(&self, id: Uuid) -> StoreResult<Article> {
        self.articles
            .get(id)
            .await
            .ok_or_else(|| StoreError::not_found("Article", id))
    }

    pub async fn get_by_code(&self, code: &str) -> StoreResult<Article> {
        let code = code.trim().to_uppercase();
        self.articles
            .find(|a| a.code == code)
            .await
            .ok_or_else(|| StoreError::not_found("Article", code))
    }

    pub async fn get_by_barcode(&self, barcode: &str) -> StoreResult<Article> {
        self.articles
            .find(|a| a.barcodes.iter().any(|b| b == barcode))
            .await
            .ok_or_else(|| StoreError::not_found("Article", barcode))
    }

    /// Snapshot of several articles keyed by id, as consumed by the kit
    /// availability math. Missing ids are simply absent from the map.
    pub async fn get_by_ids(&self, ids: &[Uuid]) -> HashMap<Uuid, Article> {
        let articles = self.articles.read().await;
        ids.iter()
            .filter_map(|id| articles.get(id).map(|a| (*id, a.clone())))
            .collect()
    }

    /// Replaces an existing article.
    pub async fn update(&self, article: Article) -> StoreResult<()> {
        article.validate()?;

        let mut articles = self.articles.write().await;
        if !articles.contains_key(&article.id) {
            return Err(StoreError::not_found("Article", article.id));
        }
        debug!(code = %article.code, "updating article");
        articles.insert(article.id, article);
        Ok(())
    }

    /// Applies a stock mutation under the collection write lock and returns
    /// the updated article. The closure runs at most once.
    pub async fn update_stock<F>(&self, id: Uuid, mutate: F) -> StoreResult<Article>
    where
        F: FnOnce(&mut Article) -> ricambi_core::CoreResult<()>,
    {
        let mut articles = self.articles.write().await;
        let article = articles
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("Article", id))?;
        mutate(article)?;
        debug!(code = %article.code, available = article.stock.available(), "stock updated");
        Ok(article.clone())
    }

    pub async fn list_active(&self) -> Vec<Article> {
        self.articles.filter(|a| a.is_active).await
    }

    /// Articles at or below their reorder point, for the restock report.
    pub async fn list_low_stock(&self) -> Vec<Article> {
        self.articles
            .filter(|a| a.is_active && a.is_low_stock())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(code: &str) -> Article {
        Article::new(code, "Articolo di prova").unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let repo = ArticleRepository::new();
        let mut a = article("FLT-OIL-01");
        a.add_barcode("8001234567890").unwrap();
        let id = a.id;
        repo.insert(a).await.unwrap();

        assert_eq!(repo.get_by_id(id).await.unwrap().code, "FLT-OIL-01");
        assert_eq!(repo.get_by_code("flt-oil-01").await.unwrap().id, id);
        assert_eq!(repo.get_by_barcode("8001234567890").await.unwrap().id, id);
        assert!(matches!(
            repo.get_by_code("MISSING").await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected() {
        let repo = ArticleRepository::new();
        repo.insert(article("FLT-OIL-01")).await.unwrap();

        let err = repo.insert(article("FLT-OIL-01")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));
    }

    #[tokio::test]
    async fn test_batch_snapshot_skips_missing() {
        let repo = ArticleRepository::new();
        let a = article("FLT-OIL-01");
        let a_id = a.id;
        repo.insert(a).await.unwrap();

        let snapshot = repo.get_by_ids(&[a_id, Uuid::new_v4()]).await;
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.contains_key(&a_id));
    }

    #[tokio::test]
    async fn test_update_stock_mutation() {
        let repo = ArticleRepository::new();
        let a = article("FLT-OIL-01");
        let id = a.id;
        repo.insert(a).await.unwrap();

        let updated = repo.update_stock(id, |a| a.add_stock(25)).await.unwrap();
        assert_eq!(updated.stock.on_hand, 25);

        // A failing mutation propagates the core error.
        let err = repo.update_stock(id, |a| a.remove_stock(100)).await.unwrap_err();
        assert!(matches!(err, StoreError::Core(_)));
    }

    #[tokio::test]
    async fn test_low_stock_report() {
        let repo = ArticleRepository::new();
        let mut low = article("FLT-OIL-01");
        low.stock.on_hand = 2;
        low.stock.reorder_point = 5;
        let mut fine = article("FLT-AIR-02");
        fine.stock.on_hand = 50;
        fine.stock.reorder_point = 5;
        repo.insert(low).await.unwrap();
        repo.insert(fine).await.unwrap();

        let report = repo.list_low_stock().await;
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].code, "FLT-OIL-01");
    }
}
