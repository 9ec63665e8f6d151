//! # Document Collections
//!
//! The shared in-memory store primitive: a `HashMap` of documents behind a
//! `tokio::sync::RwLock`, cheaply cloneable across tasks via `Arc`.
//!
//! ## Locking Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Collection<T> Locking                               │
//! │                                                                         │
//! │  Readers (quotes, lookups)      Writers (stock moves, usage counts)     │
//! │  ──────────────────────────     ────────────────────────────────────    │
//! │  read().await  ── many at once  write().await ── exclusive              │
//! │                                                                         │
//! │  Multi-document operations (kit reservation) take ONE write guard and   │
//! │  mutate every affected document under it, so partial updates are never  │
//! │  visible and check-then-act races cannot occur.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// A shared in-memory collection of documents keyed by id.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    inner: Arc<RwLock<HashMap<Uuid, T>>>,
}

// Manual impl: the derive would demand `T: Default` for no reason.
impl<T> Default for Collection<T> {
    fn default() -> Self {
        Collection {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<T: Clone> Collection<T> {
    pub fn new() -> Self {
        Collection {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Shared read access to the underlying map.
    pub async fn read(&self) -> RwLockReadGuard<'_, HashMap<Uuid, T>> {
        self.inner.read().await
    }

    /// Exclusive write access to the underlying map. Hold one guard across
    /// a whole multi-document operation to keep it atomic.
    pub async fn write(&self) -> RwLockWriteGuard<'_, HashMap<Uuid, T>> {
        self.inner.write().await
    }

    /// Inserts or replaces a document.
    pub async fn put(&self, id: Uuid, document: T) {
        self.inner.write().await.insert(id, document);
    }

    /// Clones the document with this id, if present.
    pub async fn get(&self, id: Uuid) -> Option<T> {
        self.inner.read().await.get(&id).cloned()
    }

    /// Removes a document, returning it if it existed.
    pub async fn remove(&self, id: Uuid) -> Option<T> {
        self.inner.write().await.remove(&id)
    }

    /// Clones every document matching the predicate.
    pub async fn filter(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        self.inner
            .read()
            .await
            .values()
            .filter(|doc| predicate(doc))
            .cloned()
            .collect()
    }

    /// Finds the first document matching the predicate.
    pub async fn find(&self, predicate: impl Fn(&T) -> bool) -> Option<T> {
        self.inner
            .read()
            .await
            .values()
            .find(|doc| predicate(doc))
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_remove() {
        let collection: Collection<String> = Collection::new();
        let id = Uuid::new_v4();

        collection.put(id, "filtro".to_string()).await;
        assert_eq!(collection.get(id).await.as_deref(), Some("filtro"));
        assert_eq!(collection.len().await, 1);

        assert_eq!(collection.remove(id).await.as_deref(), Some("filtro"));
        assert!(collection.get(id).await.is_none());
        assert!(collection.is_empty().await);
    }

    #[tokio::test]
    async fn test_filter_and_find() {
        let collection: Collection<i64> = Collection::new();
        for value in [1, 2, 3, 4] {
            collection.put(Uuid::new_v4(), value).await;
        }

        let mut evens = collection.filter(|v| v % 2 == 0).await;
        evens.sort();
        assert_eq!(evens, vec![2, 4]);
        assert!(collection.find(|v| *v == 3).await.is_some());
        assert!(collection.find(|v| *v == 9).await.is_none());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let collection: Collection<i64> = Collection::new();
        let other = collection.clone();
        let id = Uuid::new_v4();

        collection.put(id, 42).await;
        assert_eq!(other.get(id).await, Some(42));
    }
}
