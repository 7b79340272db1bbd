use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{require_non_negative, ModelError, Validate};
use crate::repository::Entity;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderItem {
    pub fn line_total(&self) -> f64 {
        f64::from(self.quantity) * self.unit_price
    }
}

/// Response of `GET /api/order-item/order/{id}/total`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotal {
    pub order_id: Uuid,
    pub item_count: usize,
    pub total_quantity: i64,
    pub total: f64,
}

impl OrderTotal {
    pub fn from_items(order_id: Uuid, items: &[OrderItem]) -> Self {
        Self {
            order_id,
            item_count: items.len(),
            total_quantity: items.iter().map(|i| i64::from(i.quantity)).sum(),
            total: items.iter().map(OrderItem::line_total).sum(),
        }
    }
}

fn check_quantity(quantity: i32) -> Result<(), ModelError> {
    if quantity <= 0 {
        return Err(ModelError::Validation("Quantity must be greater than zero".to_string()));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemCreate {
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: f64,
}

impl Validate for OrderItemCreate {
    fn validate(&self) -> Result<(), ModelError> {
        check_quantity(self.quantity)?;
        require_non_negative("Unit price", self.unit_price)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
}

impl Validate for OrderItemUpdate {
    fn validate(&self) -> Result<(), ModelError> {
        if let Some(quantity) = self.quantity {
            check_quantity(quantity)?;
        }
        if let Some(price) = self.unit_price {
            require_non_negative("Unit price", price)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemFilter {
    pub order_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
}

impl Entity for OrderItem {
    type Create = OrderItemCreate;
    type Update = OrderItemUpdate;
    type Filter = OrderItemFilter;

    const NAME: &'static str = "Order item";

    fn id(&self) -> Uuid {
        self.id
    }

    fn create(input: OrderItemCreate, now: DateTime<Utc>) -> Result<Self, ModelError> {
        Ok(OrderItem {
            id: Uuid::new_v4(),
            order_id: input.order_id,
            product_id: input.product_id,
            quantity: input.quantity,
            unit_price: input.unit_price,
            created_at: now,
            updated_at: now,
        })
    }

    fn apply(&mut self, update: OrderItemUpdate, now: DateTime<Utc>) -> Result<(), ModelError> {
        if let Some(quantity) = update.quantity {
            self.quantity = quantity;
        }
        if let Some(price) = update.unit_price {
            self.unit_price = price;
        }
        self.updated_at = now;
        Ok(())
    }

    fn matches(&self, filter: &OrderItemFilter) -> bool {
        filter.order_id.map_or(true, |id| self.order_id == id)
            && filter.product_id.map_or(true, |id| self.product_id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(order_id: Uuid, quantity: i32, unit_price: f64) -> OrderItem {
        OrderItem::create(
            OrderItemCreate {
                order_id,
                product_id: Uuid::new_v4(),
                quantity,
                unit_price,
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn test_order_total_sums_line_totals() {
        let order_id = Uuid::new_v4();
        let items = vec![item(order_id, 2, 12.5), item(order_id, 3, 4.0)];
        let total = OrderTotal::from_items(order_id, &items);
        assert_eq!(total.item_count, 2);
        assert_eq!(total.total_quantity, 5);
        assert!((total.total - 37.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_order_total_is_zero() {
        let total = OrderTotal::from_items(Uuid::new_v4(), &[]);
        assert_eq!(total.item_count, 0);
        assert_eq!(total.total, 0.0);
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let input = OrderItemCreate {
            order_id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            quantity: 0,
            unit_price: 1.0,
        };
        assert!(input.validate().is_err());
    }
}
