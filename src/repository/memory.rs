use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Entity, Repository};
use crate::error::StoreError;

/// In-process store used for tests and `STORAGE_BACKEND=memory`.
///
/// Keeps insertion order and enforces the same natural-key uniqueness as the SQL schema.
pub struct MemoryRepository<T: Entity> {
    rows: RwLock<Vec<T>>,
}

impl<T: Entity> MemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }

    fn check_unique(rows: &[T], candidate: &T) -> Result<(), StoreError> {
        let Some(key) = candidate.unique_key() else {
            return Ok(());
        };
        let taken = rows
            .iter()
            .any(|row| row.id() != candidate.id() && row.unique_key().as_deref() == Some(key.as_str()));
        if taken {
            return Err(StoreError::Conflict(format!("{} '{}' already exists", T::NAME, key)));
        }
        Ok(())
    }
}

impl<T: Entity> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for MemoryRepository<T> {
    async fn list(&self, filter: &T::Filter) -> Result<Vec<T>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows.iter().filter(|row| row.matches(filter)).cloned().collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<T>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|row| row.id() == id).cloned())
    }

    async fn insert(&self, entity: T) -> Result<T, StoreError> {
        let mut rows = self.rows.write().await;
        if rows.iter().any(|row| row.id() == entity.id()) {
            return Err(StoreError::Conflict(format!("{} '{}' already exists", T::NAME, entity.id())));
        }
        Self::check_unique(&rows, &entity)?;
        rows.push(entity.clone());
        Ok(entity)
    }

    async fn save(&self, entity: T) -> Result<T, StoreError> {
        let mut rows = self.rows.write().await;
        Self::check_unique(&rows, &entity)?;
        let slot = rows
            .iter_mut()
            .find(|row| row.id() == entity.id())
            .ok_or_else(|| StoreError::NotFound {
                entity: T::NAME,
                id: entity.id().to_string(),
            })?;
        *slot = entity.clone();
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|row| row.id() != id);
        Ok(rows.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::product::sample_product;
    use crate::models::{Product, ProductFilter};

    #[tokio::test]
    async fn test_duplicate_sku_conflicts() {
        let repo = MemoryRepository::<Product>::new();
        repo.insert(sample_product("SKU-1", 5, 0, 1)).await.unwrap();

        let err = repo.insert(sample_product("sku-1", 9, 0, 1)).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_save_may_keep_own_sku() {
        let repo = MemoryRepository::<Product>::new();
        let mut product = repo.insert(sample_product("SKU-2", 5, 0, 1)).await.unwrap();
        product.quantity = 50;
        let saved = repo.save(product).await.unwrap();
        assert_eq!(saved.quantity, 50);
    }

    #[tokio::test]
    async fn test_save_missing_is_not_found() {
        let repo = MemoryRepository::<Product>::new();
        let err = repo.save(sample_product("SKU-3", 1, 0, 1)).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_reports_whether_removed() {
        let repo = MemoryRepository::<Product>::new();
        let product = repo.insert(sample_product("SKU-4", 1, 0, 1)).await.unwrap();
        assert!(repo.delete(product.id).await.unwrap());
        assert!(!repo.delete(product.id).await.unwrap());
        assert!(repo.list(&ProductFilter::default()).await.unwrap().is_empty());
    }
}
