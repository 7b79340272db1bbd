pub mod inventory;
pub mod order;
pub mod order_item;
pub mod product;
pub mod supplier;
pub mod warehouse;

pub use inventory::{collect_alerts, AlertSeverity, InventoryAlert, InventoryAlertType};
pub use order::{
    Order, OrderCreate, OrderFilter, OrderPriority, OrderStatus, OrderType, OrderUpdate, PaymentStatus,
};
pub use order_item::{OrderItem, OrderItemCreate, OrderItemFilter, OrderItemUpdate, OrderTotal};
pub use product::{Product, ProductCreate, ProductFilter, ProductStatus, ProductUpdate, StockStatus};
pub use supplier::{
    PaymentTerms, Supplier, SupplierCreate, SupplierFilter, SupplierStatus, SupplierSummary, SupplierUpdate,
};
pub use warehouse::{utilization_rate, Warehouse, WarehouseCreate, WarehouseFilter, WarehouseStatus, WarehouseUpdate};

use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Errors raised while validating input or applying a change to an entity
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModelError {
    #[error("{0}")]
    Validation(String),

    #[error("Cannot change order status from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
}

/// Form-level checks run before a create/update is accepted.
///
/// The client providers run the same checks so invalid input is never sent.
pub trait Validate {
    fn validate(&self) -> Result<(), ModelError>;
}

pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<(), ModelError> {
    if value.trim().is_empty() {
        return Err(ModelError::Validation(format!("{field} is required")));
    }
    Ok(())
}

pub(crate) fn require_non_negative(field: &str, value: f64) -> Result<(), ModelError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ModelError::Validation(format!("{field} must be a non-negative number")));
    }
    Ok(())
}

pub(crate) fn require_non_negative_int(field: &str, value: i32) -> Result<(), ModelError> {
    if value < 0 {
        return Err(ModelError::Validation(format!("{field} must not be negative")));
    }
    Ok(())
}

/// Tells an explicit `null` apart from an absent field in partial updates.
///
/// Use with `#[serde(default, deserialize_with = "nullable")]`: absent stays `None`,
/// `null` becomes `Some(None)` and clears the stored value.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
