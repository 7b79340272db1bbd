//! Per-entity client state: the loaded list, a selection, and loading/error flags.
//!
//! Every remote operation follows the same shape: mark loading and clear the previous
//! error, call the API, then either fold the result into local state or record the
//! server's message. Loading is always reset before returning.

use tracing::warn;
use uuid::Uuid;

use super::api::{ApiClient, ClientError};
use crate::models::{Order, OrderItem, OrderStatus, OrderTotal, Product, Supplier, Validate, Warehouse};
use crate::repository::Entity;

/// Entity exposed under `/api/<PATH>`
pub trait Resource: Entity {
    const PATH: &'static str;
}

impl Resource for Order {
    const PATH: &'static str = "order";
}

impl Resource for Product {
    const PATH: &'static str = "product";
}

impl Resource for Supplier {
    const PATH: &'static str = "supplier";
}

impl Resource for Warehouse {
    const PATH: &'static str = "warehouse";
}

impl Resource for OrderItem {
    const PATH: &'static str = "order-item";
}

pub type OrderProvider = EntityProvider<Order>;
pub type ProductProvider = EntityProvider<Product>;
pub type SupplierProvider = EntityProvider<Supplier>;
pub type WarehouseProvider = EntityProvider<Warehouse>;
pub type OrderItemProvider = EntityProvider<OrderItem>;

#[derive(Debug, Clone)]
pub struct EntityProvider<T: Resource> {
    client: ApiClient,
    items: Vec<T>,
    selected: Option<T>,
    loading: bool,
    error: Option<String>,
    loaded: bool,
}

impl<T: Resource> EntityProvider<T> {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            items: Vec::new(),
            selected: None,
            loading: false,
            error: None,
            loaded: false,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn selected(&self) -> Option<&T> {
        self.selected.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn has_loaded(&self) -> bool {
        self.loaded
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// Record the outcome of a remote call and reset loading
    fn finish<R>(&mut self, result: Result<R, ClientError>) -> Option<R> {
        self.loading = false;
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("❌ {} request failed: {}", T::NAME, e);
                self.error = Some(e.user_message());
                None
            }
        }
    }

    fn replace(&mut self, entity: &T) {
        let id = entity.id();
        if let Some(slot) = self.items.iter_mut().find(|item| item.id() == id) {
            *slot = entity.clone();
        }
        if self.selected.as_ref().is_some_and(|s| s.id() == id) {
            self.selected = Some(entity.clone());
        }
    }

    /// Replace the list with everything the server has
    pub async fn fetch_all(&mut self) -> bool {
        self.begin();
        let result = self.client.get::<Vec<T>>(T::PATH).await;
        match self.finish(result) {
            Some(items) => {
                self.items = items;
                self.loaded = true;
                true
            }
            None => false,
        }
    }

    /// Load the full list unless it is already loaded
    pub async fn ensure_loaded(&mut self) -> bool {
        if self.loaded {
            return true;
        }
        self.fetch_all().await
    }

    /// Load a single entity into `selected`
    pub async fn fetch_by_id(&mut self, id: Uuid) -> Option<T> {
        self.begin();
        let result = self.client.get::<T>(&format!("{}/{id}", T::PATH)).await;
        let entity = self.finish(result)?;
        self.selected = Some(entity.clone());
        Some(entity)
    }

    /// Replace the list with a filtered sub-resource such as `low-stock` or `status/active`.
    ///
    /// The list is then a subset, so the next `ensure_loaded` fetches the full table again.
    pub async fn fetch_filtered(&mut self, path: &str) -> bool {
        self.begin();
        let result = self.client.get::<Vec<T>>(&format!("{}/{path}", T::PATH)).await;
        match self.finish(result) {
            Some(items) => {
                self.items = items;
                self.loaded = false;
                true
            }
            None => false,
        }
    }

    /// Invalid input is reported locally and never sent
    pub async fn create(&mut self, input: &T::Create) -> Option<T> {
        if let Err(e) = input.validate() {
            self.error = Some(e.to_string());
            return None;
        }
        self.begin();
        let result = self.client.post::<T, _>(T::PATH, input).await;
        let entity = self.finish(result)?;
        self.items.push(entity.clone());
        Some(entity)
    }

    pub async fn update(&mut self, id: Uuid, input: &T::Update) -> Option<T> {
        if let Err(e) = input.validate() {
            self.error = Some(e.to_string());
            return None;
        }
        self.begin();
        let result = self.client.put::<T, _>(&format!("{}/{id}", T::PATH), input).await;
        let entity = self.finish(result)?;
        self.replace(&entity);
        Some(entity)
    }

    pub async fn remove(&mut self, id: Uuid) -> bool {
        self.begin();
        let result = self.client.delete(&format!("{}/{id}", T::PATH)).await;
        if self.finish(result).is_none() {
            return false;
        }
        self.items.retain(|item| item.id() != id);
        if self.selected.as_ref().is_some_and(|s| s.id() == id) {
            self.selected = None;
        }
        true
    }
}

impl EntityProvider<Order> {
    /// Move an order through its lifecycle; illegal transitions come back as the server's 409 message
    pub async fn update_status(&mut self, id: Uuid, status: OrderStatus) -> Option<Order> {
        self.begin();
        let body = serde_json::json!({ "status": status });
        let result = self
            .client
            .put::<Order, _>(&format!("{}/{id}/status", Order::PATH), &body)
            .await;
        let order = self.finish(result)?;
        self.replace(&order);
        Some(order)
    }
}

impl EntityProvider<OrderItem> {
    pub async fn fetch_for_order(&mut self, order_id: Uuid) -> bool {
        self.fetch_filtered(&format!("order/{order_id}")).await
    }

    /// Server-computed sum of `quantity * unit_price`
    pub async fn order_total(&mut self, order_id: Uuid) -> Option<f64> {
        self.begin();
        let result = self
            .client
            .get::<OrderTotal>(&format!("{}/order/{order_id}/total", OrderItem::PATH))
            .await;
        self.finish(result).map(|total| total.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::api::TokenStore;
    use crate::constants::MSG_UNAUTHORIZED;
    use crate::models::{OrderCreate, OrderItemCreate, ProductCreate, ProductUpdate, WarehouseCreate};
    use crate::testing::{spawn_app, test_state, token_for};
    use crate::types::Role;

    async fn connected_client() -> ApiClient {
        let state = test_state(10);
        let (_, token) = token_for(&state, Role::Manager);
        let base_url = spawn_app(state).await;
        ApiClient::new(base_url, TokenStore::new(Some(token)))
    }

    fn product_input(sku: &str, quantity: i32) -> ProductCreate {
        serde_json::from_value(serde_json::json!({
            "sku": sku,
            "name": format!("Product {sku}"),
            "price": 4.5,
            "quantity": quantity,
            "minStockLevel": 5
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_product_provider_crud() {
        let client = connected_client().await;
        let mut products = ProductProvider::new(client);

        assert!(products.ensure_loaded().await);
        assert!(products.has_loaded());
        assert!(products.items().is_empty());

        let created = products.create(&product_input("PRV-1", 20)).await.unwrap();
        assert_eq!(products.items().len(), 1);
        assert!(!products.is_loading());

        let fetched = products.fetch_by_id(created.id).await.unwrap();
        assert_eq!(fetched.sku, "PRV-1");
        assert_eq!(products.selected().map(|p| p.id), Some(created.id));

        let update: ProductUpdate = serde_json::from_value(serde_json::json!({ "quantity": 2 })).unwrap();
        let updated = products.update(created.id, &update).await.unwrap();
        assert_eq!(updated.quantity, 2);
        assert_eq!(products.items()[0].quantity, 2);
        assert_eq!(products.selected().map(|p| p.quantity), Some(2));

        assert!(products.fetch_filtered("low-stock").await);
        assert_eq!(products.items().len(), 1);

        assert!(products.remove(created.id).await);
        assert!(products.items().is_empty());
        assert!(products.selected().is_none());
        assert!(products.error().is_none());
    }

    #[tokio::test]
    async fn test_ensure_loaded_refetches_after_filtered_list() {
        let client = connected_client().await;
        let mut products = ProductProvider::new(client);
        products.create(&product_input("LOW-1", 1)).await.unwrap();
        products.create(&product_input("OK-1", 100)).await.unwrap();

        assert!(products.fetch_all().await);
        assert_eq!(products.items().len(), 2);

        assert!(products.fetch_filtered("low-stock").await);
        assert_eq!(products.items().len(), 1);
        assert!(!products.has_loaded());

        assert!(products.ensure_loaded().await);
        assert!(products.has_loaded());
        assert_eq!(products.items().len(), 2);
    }

    #[tokio::test]
    async fn test_server_message_becomes_provider_error() {
        let client = connected_client().await;
        let mut products = ProductProvider::new(client);

        assert!(products.fetch_by_id(Uuid::new_v4()).await.is_none());
        assert!(products.error().is_some_and(|e| e.ends_with("not found")));
        assert!(!products.is_loading());

        products.create(&product_input("DUP-1", 1)).await.unwrap();
        assert!(products.create(&product_input("dup-1", 1)).await.is_none());
        assert!(products.error().is_some_and(|e| e.contains("already exists")));
        assert_eq!(products.items().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_input_is_not_sent() {
        let client = connected_client().await;
        let mut products = ProductProvider::new(client);

        assert!(products.create(&product_input("   ", 1)).await.is_none());
        assert_eq!(products.error(), Some("SKU is required"));

        assert!(products.fetch_all().await);
        assert!(products.items().is_empty());
        assert!(products.error().is_none());
    }

    #[tokio::test]
    async fn test_missing_token_reports_unauthorized() {
        let state = test_state(10);
        let base_url = spawn_app(state).await;
        let tokens = TokenStore::default();
        let mut warehouses = WarehouseProvider::new(ApiClient::new(base_url, tokens.clone()));

        assert!(!warehouses.fetch_all().await);
        assert_eq!(warehouses.error(), Some(MSG_UNAUTHORIZED));
        assert!(!warehouses.has_loaded());
    }

    #[tokio::test]
    async fn test_order_status_and_item_total() {
        let client = connected_client().await;
        let mut warehouses = WarehouseProvider::new(client.clone());
        let mut products = ProductProvider::new(client.clone());
        let mut orders = OrderProvider::new(client.clone());
        let mut items = OrderItemProvider::new(client);

        let warehouse_input: WarehouseCreate =
            serde_json::from_value(serde_json::json!({ "name": "North", "location": "Oslo" })).unwrap();
        let warehouse = warehouses.create(&warehouse_input).await.unwrap();
        let product = products.create(&product_input("ORD-1", 50)).await.unwrap();

        let order_input: OrderCreate =
            serde_json::from_value(serde_json::json!({ "warehouseId": warehouse.id })).unwrap();
        let order = orders.create(&order_input).await.unwrap();

        for (quantity, price) in [(2, 5.0), (3, 1.5)] {
            let input: OrderItemCreate = serde_json::from_value(serde_json::json!({
                "orderId": order.id,
                "productId": product.id,
                "quantity": quantity,
                "unitPrice": price
            }))
            .unwrap();
            items.create(&input).await.unwrap();
        }
        assert_eq!(items.order_total(order.id).await, Some(14.5));
        assert!(items.fetch_for_order(order.id).await);
        assert_eq!(items.items().len(), 2);

        let shipped = orders.update_status(order.id, OrderStatus::Shipped).await.unwrap();
        assert_eq!(shipped.status, OrderStatus::Shipped);
        assert!(shipped.shipped_date.is_some());
        assert_eq!(orders.items()[0].status, OrderStatus::Shipped);

        assert!(orders.update_status(order.id, OrderStatus::Cancelled).await.is_none());
        assert_eq!(
            orders.error(),
            Some("Cannot change order status from shipped to cancelled")
        );
    }
}
