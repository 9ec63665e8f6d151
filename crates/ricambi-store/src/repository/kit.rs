//! # Kit Repository
//!
//! Collection operations for kit definitions. Stock movements that touch a
//! kit's components go through the stock service, which coordinates this
//! repository with the article collection under one lock.

use tracing::debug;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::store::Collection;
use ricambi_core::Kit;

/// Repository for kit collection operations.
#[derive(Debug, Clone, Default)]
pub struct KitRepository {
    kits: Collection<Kit>,
}

impl KitRepository {
    pub fn new() -> Self {
        KitRepository {
            kits: Collection::new(),
        }
    }

    /// Inserts a new kit. Codes are unique.
    pub async fn insert(&self, kit: Kit) -> StoreResult<()> {
        kit.validate()?;

        let mut kits = self.kits.write().await;
        if kits.values().any(|k| k.code == kit.code) {
            return Err(StoreError::duplicate("code", &kit.code));
        }
        debug!(code = %kit.code, components = kit.components.len(), "inserting kit");
        kits.insert(kit.id, kit);
        Ok(())
    }

    pub async fn get_by_id(&self, id: Uuid) -> StoreResult<Kit> {
        self.kits
            .get(id)
            .await
            .ok_or_else(|| StoreError::not_found("Kit", id))
    }

    pub async fn get_by_code(&self, code: &str) -> StoreResult<Kit> {
        let code = code.trim().to_uppercase();
        self.kits
            .find(|k| k.code == code)
            .await
            .ok_or_else(|| StoreError::not_found("Kit", code))
    }

    /// Replaces an existing kit.
    pub async fn update(&self, kit: Kit) -> StoreResult<()> {
        kit.validate()?;

        let mut kits = self.kits.write().await;
        if !kits.contains_key(&kit.id) {
            return Err(StoreError::not_found("Kit", kit.id));
        }
        debug!(code = %kit.code, "updating kit");
        kits.insert(kit.id, kit);
        Ok(())
    }

    pub async fn list_active(&self) -> Vec<Kit> {
        self.kits.filter(|k| k.is_active).await
    }

    /// Kits containing the given article, for cache invalidation when the
    /// article's stock or price moves.
    pub async fn list_containing(&self, article_id: Uuid) -> Vec<Kit> {
        self.kits
            .filter(|k| k.components.iter().any(|c| c.article_id == article_id))
            .await
    }
}
