use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::product::{Product, ProductStatus, StockStatus};

/// Inventory alert raised for a single product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InventoryAlert {
    pub alert_type: InventoryAlertType,
    pub product_id: Uuid,
    pub sku: String,
    pub message: String,
    pub severity: AlertSeverity,
    pub recommended_action: Option<String>,
}

/// Types of inventory alerts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryAlertType {
    OutOfStock,
    CriticalStock,
    LowStock,
    Overstock,
}

/// Alert severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Critical, // Nothing left to sell or ship
    Warning,  // Should be replenished soon
    Info,     // Informational only
}

impl InventoryAlert {
    pub fn out_of_stock(product: &Product) -> Self {
        Self {
            alert_type: InventoryAlertType::OutOfStock,
            product_id: product.id,
            sku: product.sku.clone(),
            message: format!("{} ({}) is out of stock", product.name, product.sku),
            severity: AlertSeverity::Critical,
            recommended_action: Some("Raise a purchase order with the supplier".to_string()),
        }
    }

    pub fn critical_stock(product: &Product) -> Self {
        Self {
            alert_type: InventoryAlertType::CriticalStock,
            product_id: product.id,
            sku: product.sku.clone(),
            message: format!(
                "Critical stock: {} has only {} available (minimum {})",
                product.sku,
                product.available_quantity(),
                product.min_stock_level
            ),
            severity: AlertSeverity::Critical,
            recommended_action: Some("Replenish immediately".to_string()),
        }
    }

    pub fn low_stock(product: &Product) -> Self {
        Self {
            alert_type: InventoryAlertType::LowStock,
            product_id: product.id,
            sku: product.sku.clone(),
            message: format!(
                "Low stock: {} has {} available (minimum {})",
                product.sku,
                product.available_quantity(),
                product.min_stock_level
            ),
            severity: AlertSeverity::Warning,
            recommended_action: Some("Consider replenishing stock soon".to_string()),
        }
    }

    pub fn overstock(product: &Product) -> Self {
        Self {
            alert_type: InventoryAlertType::Overstock,
            product_id: product.id,
            sku: product.sku.clone(),
            message: format!(
                "Overstock: {} holds {} units, above the maximum of {}",
                product.sku, product.quantity, product.max_stock_level
            ),
            severity: AlertSeverity::Info,
            recommended_action: Some("Pause purchasing or move stock to another warehouse".to_string()),
        }
    }

    /// Alert for a product, if any. Discontinued products never alert.
    pub fn for_product(product: &Product) -> Option<Self> {
        if product.status == ProductStatus::Discontinued {
            return None;
        }
        match product.stock_status() {
            StockStatus::OutOfStock => Some(Self::out_of_stock(product)),
            StockStatus::Critical => Some(Self::critical_stock(product)),
            StockStatus::LowStock => Some(Self::low_stock(product)),
            StockStatus::InStock if product.max_stock_level > 0 && product.quantity > product.max_stock_level => {
                Some(Self::overstock(product))
            }
            StockStatus::InStock => None,
        }
    }
}

/// Alerts for all products, most severe first
pub fn collect_alerts(products: &[Product]) -> Vec<InventoryAlert> {
    let mut alerts: Vec<InventoryAlert> = products.iter().filter_map(InventoryAlert::for_product).collect();
    alerts.sort_by(|a, b| a.severity.cmp(&b.severity).then_with(|| a.sku.cmp(&b.sku)));
    alerts
}
