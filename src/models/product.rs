use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::{nullable, require_non_empty, require_non_negative, require_non_negative_int, ModelError, Validate};
use crate::repository::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Active,
    Inactive,
    Discontinued,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Active => "active",
            ProductStatus::Inactive => "inactive",
            ProductStatus::Discontinued => "discontinued",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "active" => Some(ProductStatus::Active),
            "inactive" => Some(ProductStatus::Inactive),
            "discontinued" => Some(ProductStatus::Discontinued),
            _ => None,
        }
    }
}

/// Availability classification derived from quantity against the minimum stock level.
///
/// `available = quantity - reserved_quantity` (floored at zero) drives every bucket:
/// out of stock when nothing is available, critical at or below half the minimum,
/// low at or below the minimum, in stock otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    OutOfStock,
    Critical,
    LowStock,
    InStock,
}

impl StockStatus {
    pub fn classify(quantity: i32, reserved_quantity: i32, min_stock_level: i32) -> Self {
        let quantity = i64::from(quantity);
        let available = (quantity - i64::from(reserved_quantity)).max(0);
        let min = i64::from(min_stock_level);

        if quantity <= 0 || available == 0 {
            StockStatus::OutOfStock
        } else if available * 2 <= min {
            StockStatus::Critical
        } else if available <= min {
            StockStatus::LowStock
        } else {
            StockStatus::InStock
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::OutOfStock => "out_of_stock",
            StockStatus::Critical => "critical",
            StockStatus::LowStock => "low_stock",
            StockStatus::InStock => "in_stock",
        }
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub cost_price: f64,
    pub quantity: i32,
    pub reserved_quantity: i32,
    pub min_stock_level: i32,
    pub max_stock_level: i32,
    pub category: Option<String>,
    pub supplier_id: Option<Uuid>,
    pub warehouse_id: Option<Uuid>,
    pub total_sold: i32,
    pub total_revenue: f64,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn available_quantity(&self) -> i32 {
        (self.quantity - self.reserved_quantity).max(0)
    }

    pub fn stock_status(&self) -> StockStatus {
        StockStatus::classify(self.quantity, self.reserved_quantity, self.min_stock_level)
    }

    /// Shelf value at list price
    pub fn inventory_value(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }

    fn check_levels(&self) -> Result<(), ModelError> {
        if self.reserved_quantity > self.quantity {
            return Err(ModelError::Validation(
                "Reserved quantity cannot exceed quantity on hand".to_string(),
            ));
        }
        if self.max_stock_level > 0 && self.max_stock_level < self.min_stock_level {
            return Err(ModelError::Validation(
                "Maximum stock level must not be below the minimum stock level".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreate {
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub cost_price: f64,
    #[serde(default)]
    pub quantity: i32,
    #[serde(default)]
    pub reserved_quantity: i32,
    #[serde(default)]
    pub min_stock_level: i32,
    #[serde(default)]
    pub max_stock_level: i32,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub supplier_id: Option<Uuid>,
    #[serde(default)]
    pub warehouse_id: Option<Uuid>,
    #[serde(default)]
    pub status: Option<ProductStatus>,
}

impl Validate for ProductCreate {
    fn validate(&self) -> Result<(), ModelError> {
        require_non_empty("SKU", &self.sku)?;
        require_non_empty("Product name", &self.name)?;
        require_non_negative("Price", self.price)?;
        require_non_negative("Cost price", self.cost_price)?;
        require_non_negative_int("Quantity", self.quantity)?;
        require_non_negative_int("Reserved quantity", self.reserved_quantity)?;
        require_non_negative_int("Minimum stock level", self.min_stock_level)?;
        require_non_negative_int("Maximum stock level", self.max_stock_level)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reserved_quantity: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_stock_level: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_stock_level: Option<i32>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub category: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub warehouse_id: Option<Option<Uuid>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_sold: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_revenue: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProductStatus>,
}

impl Validate for ProductUpdate {
    fn validate(&self) -> Result<(), ModelError> {
        if let Some(sku) = &self.sku {
            require_non_empty("SKU", sku)?;
        }
        if let Some(name) = &self.name {
            require_non_empty("Product name", name)?;
        }
        if let Some(price) = self.price {
            require_non_negative("Price", price)?;
        }
        if let Some(cost) = self.cost_price {
            require_non_negative("Cost price", cost)?;
        }
        if let Some(revenue) = self.total_revenue {
            require_non_negative("Total revenue", revenue)?;
        }
        for (field, value) in [
            ("Quantity", self.quantity),
            ("Reserved quantity", self.reserved_quantity),
            ("Minimum stock level", self.min_stock_level),
            ("Maximum stock level", self.max_stock_level),
            ("Total sold", self.total_sold),
        ] {
            if let Some(v) = value {
                require_non_negative_int(field, v)?;
            }
        }
        Ok(())
    }
}

/// Query-string filters for product listings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    pub sku: Option<String>,
    pub supplier_id: Option<Uuid>,
    pub warehouse_id: Option<Uuid>,
    pub category: Option<String>,
    pub status: Option<ProductStatus>,
}

impl Entity for Product {
    type Create = ProductCreate;
    type Update = ProductUpdate;
    type Filter = ProductFilter;

    const NAME: &'static str = "Product";

    fn id(&self) -> Uuid {
        self.id
    }

    fn create(input: ProductCreate, now: DateTime<Utc>) -> Result<Self, ModelError> {
        let product = Product {
            id: Uuid::new_v4(),
            sku: input.sku.trim().to_string(),
            name: input.name.trim().to_string(),
            description: input.description,
            price: input.price,
            cost_price: input.cost_price,
            quantity: input.quantity,
            reserved_quantity: input.reserved_quantity,
            min_stock_level: input.min_stock_level,
            max_stock_level: input.max_stock_level,
            category: input.category,
            supplier_id: input.supplier_id,
            warehouse_id: input.warehouse_id,
            total_sold: 0,
            total_revenue: 0.0,
            status: input.status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };
        product.check_levels()?;
        Ok(product)
    }

    fn apply(&mut self, update: ProductUpdate, now: DateTime<Utc>) -> Result<(), ModelError> {
        let mut next = self.clone();
        if let Some(sku) = update.sku {
            next.sku = sku.trim().to_string();
        }
        if let Some(name) = update.name {
            next.name = name.trim().to_string();
        }
        if let Some(description) = update.description {
            next.description = description;
        }
        if let Some(price) = update.price {
            next.price = price;
        }
        if let Some(cost) = update.cost_price {
            next.cost_price = cost;
        }
        if let Some(quantity) = update.quantity {
            next.quantity = quantity;
        }
        if let Some(reserved) = update.reserved_quantity {
            next.reserved_quantity = reserved;
        }
        if let Some(min) = update.min_stock_level {
            next.min_stock_level = min;
        }
        if let Some(max) = update.max_stock_level {
            next.max_stock_level = max;
        }
        if let Some(category) = update.category {
            next.category = category;
        }
        if let Some(supplier_id) = update.supplier_id {
            next.supplier_id = supplier_id;
        }
        if let Some(warehouse_id) = update.warehouse_id {
            next.warehouse_id = warehouse_id;
        }
        if let Some(sold) = update.total_sold {
            next.total_sold = sold;
        }
        if let Some(revenue) = update.total_revenue {
            next.total_revenue = revenue;
        }
        if let Some(status) = update.status {
            next.status = status;
        }
        next.check_levels()?;
        next.updated_at = now;
        *self = next;
        Ok(())
    }

    fn matches(&self, filter: &ProductFilter) -> bool {
        filter.sku.as_deref().map_or(true, |sku| self.sku.eq_ignore_ascii_case(sku))
            && filter.supplier_id.map_or(true, |id| self.supplier_id == Some(id))
            && filter.warehouse_id.map_or(true, |id| self.warehouse_id == Some(id))
            && filter
                .category
                .as_deref()
                .map_or(true, |c| self.category.as_deref().is_some_and(|own| own.eq_ignore_ascii_case(c)))
            && filter.status.map_or(true, |s| self.status == s)
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.sku.to_ascii_lowercase())
    }
}

#[cfg(test)]
pub(crate) fn sample_product(sku: &str, quantity: i32, reserved: i32, min: i32) -> Product {
    let now = Utc::now();
    Product {
        id: Uuid::new_v4(),
        sku: sku.to_string(),
        name: format!("Product {sku}"),
        description: None,
        price: 10.0,
        cost_price: 6.0,
        quantity,
        reserved_quantity: reserved,
        min_stock_level: min,
        max_stock_level: 0,
        category: Some("general".to_string()),
        supplier_id: None,
        warehouse_id: None,
        total_sold: 0,
        total_revenue: 0.0,
        status: ProductStatus::Active,
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_quantity_is_out_of_stock_regardless_of_minimum() {
        assert_eq!(StockStatus::classify(0, 0, 0), StockStatus::OutOfStock);
        assert_eq!(StockStatus::classify(0, 0, 100), StockStatus::OutOfStock);
    }

    #[test]
    fn test_fully_reserved_stock_is_out_of_stock() {
        assert_eq!(StockStatus::classify(8, 8, 2), StockStatus::OutOfStock);
    }

    #[test]
    fn test_half_minimum_is_critical() {
        assert_eq!(StockStatus::classify(5, 0, 10), StockStatus::Critical);
        assert_eq!(StockStatus::classify(3, 0, 10), StockStatus::Critical);
        assert_eq!(StockStatus::classify(6, 0, 10), StockStatus::LowStock);
        assert_eq!(StockStatus::classify(10, 0, 10), StockStatus::LowStock);
        assert_eq!(StockStatus::classify(11, 0, 10), StockStatus::InStock);
    }

    #[test]
    fn test_reserved_quantity_reduces_availability() {
        // 20 on hand, 12 reserved -> 8 available against a minimum of 10
        assert_eq!(StockStatus::classify(20, 12, 10), StockStatus::LowStock);
    }

    #[test]
    fn test_classification_is_monotonic_in_available_quantity() {
        let mut previous = StockStatus::OutOfStock;
        for quantity in 0..40 {
            let status = StockStatus::classify(quantity, 0, 12);
            assert!(status >= previous, "{quantity} regressed to {status}");
            previous = status;
        }
    }

    #[test]
    fn test_create_rejects_reserved_above_quantity() {
        let input = ProductCreate {
            sku: "SKU-1".to_string(),
            name: "Widget".to_string(),
            price: 2.5,
            quantity: 3,
            reserved_quantity: 5,
            ..Default::default()
        };
        assert!(input.validate().is_ok());
        assert!(matches!(Product::create(input, Utc::now()), Err(ModelError::Validation(_))));
    }

    #[test]
    fn test_update_is_all_or_nothing() {
        let mut product = sample_product("SKU-2", 10, 0, 2);
        let before = product.clone();
        let update = ProductUpdate {
            name: Some("Renamed".to_string()),
            reserved_quantity: Some(50),
            ..Default::default()
        };
        assert!(product.apply(update, Utc::now()).is_err());
        assert_eq!(product, before);
    }

    #[test]
    fn test_explicit_null_clears_optional_fields() {
        let mut product = sample_product("SKU-4", 5, 0, 1);
        product.description = Some("Zinc plated".to_string());
        product.category = Some("Hardware".to_string());

        let update: ProductUpdate = serde_json::from_value(serde_json::json!({ "description": null })).unwrap();
        assert_eq!(update.description, Some(None));
        assert_eq!(update.category, None);

        product.apply(update, Utc::now()).unwrap();
        assert_eq!(product.description, None);
        assert_eq!(product.category.as_deref(), Some("Hardware"));
    }

    #[test]
    fn test_filter_matches_category_case_insensitively() {
        let product = sample_product("SKU-3", 1, 0, 0);
        let filter = ProductFilter {
            category: Some("GENERAL".to_string()),
            ..Default::default()
        };
        assert!(product.matches(&filter));
        assert!(!product.matches(&ProductFilter {
            warehouse_id: Some(Uuid::new_v4()),
            ..Default::default()
        }));
    }
}
