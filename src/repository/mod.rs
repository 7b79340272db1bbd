//! Entity store abstraction.
//!
//! Handlers and services only see `Repositories`, a bundle of trait objects that is
//! either backed by SQL Server (`database`) or by the in-process `MemoryRepository`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::database::Database;
use crate::error::StoreError;
use crate::models::{ModelError, Order, OrderItem, Product, Supplier, Validate, Warehouse};

pub mod memory;

pub use memory::MemoryRepository;

/// A persisted entity with its create/update inputs and list filter
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    type Create: Validate + Serialize + DeserializeOwned + Send + Sync + 'static;
    type Update: Validate + Serialize + DeserializeOwned + Send + Sync + 'static;
    type Filter: Default + DeserializeOwned + Send + Sync + 'static;

    /// Human readable name used in messages and logs
    const NAME: &'static str;

    fn id(&self) -> Uuid;

    /// Build a new entity from validated input
    fn create(input: Self::Create, now: DateTime<Utc>) -> Result<Self, ModelError>;

    /// Apply a partial update; on error the entity is left unchanged
    fn apply(&mut self, update: Self::Update, now: DateTime<Utc>) -> Result<(), ModelError>;

    fn matches(&self, filter: &Self::Filter) -> bool;

    /// Natural key that must be unique across the store (case-folded)
    fn unique_key(&self) -> Option<String> {
        None
    }
}

#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    async fn list(&self, filter: &T::Filter) -> Result<Vec<T>, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<T>, StoreError>;

    /// Insert a new entity; `Conflict` when its unique key is taken
    async fn insert(&self, entity: T) -> Result<T, StoreError>;

    /// Replace an existing entity; `NotFound` when it does not exist
    async fn save(&self, entity: T) -> Result<T, StoreError>;

    /// Returns false when nothing was deleted
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// All entity repositories, injected into handlers and services through `AppState`
#[derive(Clone)]
pub struct Repositories {
    pub products: Arc<dyn Repository<Product>>,
    pub suppliers: Arc<dyn Repository<Supplier>>,
    pub warehouses: Arc<dyn Repository<Warehouse>>,
    pub orders: Arc<dyn Repository<Order>>,
    pub order_items: Arc<dyn Repository<OrderItem>>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            products: Arc::new(MemoryRepository::<Product>::new()),
            suppliers: Arc::new(MemoryRepository::<Supplier>::new()),
            warehouses: Arc::new(MemoryRepository::<Warehouse>::new()),
            orders: Arc::new(MemoryRepository::<Order>::new()),
            order_items: Arc::new(MemoryRepository::<OrderItem>::new()),
        }
    }

    pub fn sql_server(database: Database) -> Self {
        let store = Arc::new(crate::database::SqlStore::new(database));
        Self {
            products: store.clone(),
            suppliers: store.clone(),
            warehouses: store.clone(),
            orders: store.clone(),
            order_items: store,
        }
    }
}

/// Selects the repository for an entity type out of `Repositories`
pub trait Stored: Entity {
    fn repository(repos: &Repositories) -> Arc<dyn Repository<Self>>;
}

impl Stored for Product {
    fn repository(repos: &Repositories) -> Arc<dyn Repository<Self>> {
        repos.products.clone()
    }
}

impl Stored for Supplier {
    fn repository(repos: &Repositories) -> Arc<dyn Repository<Self>> {
        repos.suppliers.clone()
    }
}

impl Stored for Warehouse {
    fn repository(repos: &Repositories) -> Arc<dyn Repository<Self>> {
        repos.warehouses.clone()
    }
}

impl Stored for Order {
    fn repository(repos: &Repositories) -> Arc<dyn Repository<Self>> {
        repos.orders.clone()
    }
}

impl Stored for OrderItem {
    fn repository(repos: &Repositories) -> Arc<dyn Repository<Self>> {
        repos.order_items.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProductCreate, ProductFilter};

    #[tokio::test]
    async fn test_in_memory_bundle_routes_by_type() {
        let repos = Repositories::in_memory();
        let product = Product::create(
            ProductCreate {
                sku: "BOLT-1".to_string(),
                name: "Bolt".to_string(),
                price: 0.25,
                ..Default::default()
            },
            Utc::now(),
        )
        .unwrap();

        Product::repository(&repos).insert(product.clone()).await.unwrap();

        let listed = repos.products.list(&ProductFilter::default()).await.unwrap();
        assert_eq!(listed, vec![product]);
        assert!(repos.orders.list(&Default::default()).await.unwrap().is_empty());
    }
}
