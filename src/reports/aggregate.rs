use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::range::{report_window, DateWindow, TimeRange};
use super::ReportError;
use crate::models::{
    Order, OrderPriority, OrderStatus, OrderType, PaymentStatus, PaymentTerms, Product, StockStatus, Supplier,
    SupplierStatus, SupplierSummary, Warehouse, WarehouseStatus,
};

/// Which tables a report carries; `Overview` carries all four
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    #[default]
    Overview,
    Orders,
    Products,
    Suppliers,
    Warehouses,
}

impl ReportType {
    fn includes(&self, table: ReportType) -> bool {
        *self == ReportType::Overview || *self == table
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportFilters {
    #[serde(default)]
    pub time_range: TimeRange,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub report_type: ReportType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warehouse_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<Uuid>,
}

/// Three-way projection of `StockStatus` used by reports (critical counts as low)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStockBucket {
    OutOfStock,
    LowStock,
    InStock,
}

impl From<StockStatus> for ReportStockBucket {
    fn from(status: StockStatus) -> Self {
        match status {
            StockStatus::OutOfStock => ReportStockBucket::OutOfStock,
            StockStatus::Critical | StockStatus::LowStock => ReportStockBucket::LowStock,
            StockStatus::InStock => ReportStockBucket::InStock,
        }
    }
}

impl ReportStockBucket {
    pub fn of(product: &Product) -> Self {
        product.stock_status().into()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_orders: usize,
    pub total_revenue: f64,
    pub pending_orders: usize,
    pub completed_orders: usize,
    pub average_order_value: f64,
    pub total_products: usize,
    pub in_stock: usize,
    pub low_stock: usize,
    pub out_of_stock: usize,
    pub total_inventory_value: f64,
    pub total_suppliers: usize,
    pub active_suppliers: usize,
    pub average_supplier_rating: f64,
    pub total_warehouses: usize,
    pub average_warehouse_utilization: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderReportRow {
    pub id: Uuid,
    pub order_number: String,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
    pub order_type: OrderType,
    pub payment_status: PaymentStatus,
    pub priority: OrderPriority,
    pub supplier_name: Option<String>,
    pub warehouse_name: Option<String>,
    pub total_amount: f64,
    pub paid_amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductReportRow {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    pub category: Option<String>,
    pub quantity: i32,
    pub available_quantity: i32,
    pub min_stock_level: i32,
    pub stock_status: ReportStockBucket,
    pub price: f64,
    pub inventory_value: f64,
    pub total_sold: i32,
    pub total_revenue: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SupplierReportRow {
    pub id: Uuid,
    pub name: String,
    pub status: SupplierStatus,
    pub rating: f64,
    pub payment_terms: PaymentTerms,
    pub products_count: usize,
    pub orders_count: usize,
    pub total_value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseReportRow {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub status: WarehouseStatus,
    pub capacity: i32,
    pub current_occupancy: i32,
    pub utilization_rate: f64,
    pub products_count: usize,
    pub inventory_value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub window: DateWindow,
    pub filters: ReportFilters,
    pub stats: DashboardStats,
    pub orders: Vec<OrderReportRow>,
    pub products: Vec<ProductReportRow>,
    pub suppliers: Vec<SupplierReportRow>,
    pub warehouses: Vec<WarehouseReportRow>,
}

/// Borrowed entity lists a report is derived from
#[derive(Debug, Clone, Copy)]
pub struct ReportInputs<'a> {
    pub orders: &'a [Order],
    pub products: &'a [Product],
    pub suppliers: &'a [Supplier],
    pub warehouses: &'a [Warehouse],
}

/// Owned entity lists, as loaded from the store or by the client providers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportData {
    pub orders: Vec<Order>,
    pub products: Vec<Product>,
    pub suppliers: Vec<Supplier>,
    pub warehouses: Vec<Warehouse>,
}

impl ReportData {
    pub fn inputs(&self) -> ReportInputs<'_> {
        ReportInputs {
            orders: &self.orders,
            products: &self.products,
            suppliers: &self.suppliers,
            warehouses: &self.warehouses,
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

fn within_scope(filters: &ReportFilters, supplier_id: Option<Uuid>, warehouse_id: Option<Uuid>) -> bool {
    filters.supplier_id.map_or(true, |id| supplier_id == Some(id))
        && filters.warehouse_id.map_or(true, |id| warehouse_id == Some(id))
}

fn order_stats(orders: &[&Order], stats: &mut DashboardStats) {
    stats.total_orders = orders.len();
    stats.total_revenue = orders.iter().map(|o| o.total_amount).sum();
    stats.pending_orders = orders.iter().filter(|o| o.status.is_open()).count();
    stats.completed_orders = orders.iter().filter(|o| o.status.is_fulfilled()).count();
    stats.average_order_value = if orders.is_empty() {
        0.0
    } else {
        stats.total_revenue / orders.len() as f64
    };
}

fn product_stats(products: &[&Product], stats: &mut DashboardStats) {
    stats.total_products = products.len();
    for product in products {
        match ReportStockBucket::of(product) {
            ReportStockBucket::OutOfStock => stats.out_of_stock += 1,
            ReportStockBucket::LowStock => stats.low_stock += 1,
            ReportStockBucket::InStock => stats.in_stock += 1,
        }
    }
    stats.total_inventory_value = products.iter().map(|p| p.inventory_value()).sum();
}

/// Derive stats and report tables.
///
/// Orders are limited to the time window; product figures are all-time. The optional
/// supplier/warehouse filters narrow orders, products and the per-entity tables.
pub fn build_report(
    inputs: ReportInputs<'_>,
    filters: &ReportFilters,
    now: DateTime<Utc>,
    tz: Tz,
) -> Result<Report, ReportError> {
    let window = report_window(filters, now, tz)?;

    let orders: Vec<&Order> = inputs
        .orders
        .iter()
        .filter(|o| window.contains(o.order_date))
        .filter(|o| within_scope(filters, o.supplier_id, o.warehouse_id))
        .collect();
    let products: Vec<&Product> = inputs
        .products
        .iter()
        .filter(|p| within_scope(filters, p.supplier_id, p.warehouse_id))
        .collect();
    let suppliers: Vec<&Supplier> = inputs
        .suppliers
        .iter()
        .filter(|s| filters.supplier_id.map_or(true, |id| s.id == id))
        .collect();
    let warehouses: Vec<&Warehouse> = inputs
        .warehouses
        .iter()
        .filter(|w| filters.warehouse_id.map_or(true, |id| w.id == id))
        .collect();

    let mut stats = DashboardStats::default();
    order_stats(&orders, &mut stats);
    product_stats(&products, &mut stats);
    stats.total_suppliers = suppliers.len();
    stats.active_suppliers = suppliers.iter().filter(|s| s.status == SupplierStatus::Active).count();
    stats.average_supplier_rating = mean(suppliers.iter().map(|s| s.rating));
    stats.total_warehouses = warehouses.len();
    stats.average_warehouse_utilization = mean(warehouses.iter().map(|w| w.utilization_rate()));

    let supplier_names: HashMap<Uuid, &str> = inputs.suppliers.iter().map(|s| (s.id, s.name.as_str())).collect();
    let warehouse_names: HashMap<Uuid, &str> = inputs.warehouses.iter().map(|w| (w.id, w.name.as_str())).collect();
    let name_of = |names: &HashMap<Uuid, &str>, id: Option<Uuid>| -> Option<String> {
        id.and_then(|id| names.get(&id)).map(|name| name.to_string())
    };

    let order_rows = if filters.report_type.includes(ReportType::Orders) {
        orders
            .iter()
            .map(|o| OrderReportRow {
                id: o.id,
                order_number: o.order_number.clone(),
                order_date: o.order_date,
                status: o.status,
                order_type: o.order_type,
                payment_status: o.payment_status,
                priority: o.priority,
                supplier_name: name_of(&supplier_names, o.supplier_id),
                warehouse_name: name_of(&warehouse_names, o.warehouse_id),
                total_amount: o.total_amount,
                paid_amount: o.paid_amount,
            })
            .collect()
    } else {
        Vec::new()
    };

    let product_rows = if filters.report_type.includes(ReportType::Products) {
        products
            .iter()
            .map(|p| ProductReportRow {
                id: p.id,
                sku: p.sku.clone(),
                name: p.name.clone(),
                category: p.category.clone(),
                quantity: p.quantity,
                available_quantity: p.available_quantity(),
                min_stock_level: p.min_stock_level,
                stock_status: ReportStockBucket::of(p),
                price: p.price,
                inventory_value: p.inventory_value(),
                total_sold: p.total_sold,
                total_revenue: p.total_revenue,
            })
            .collect()
    } else {
        Vec::new()
    };

    let supplier_rows = if filters.report_type.includes(ReportType::Suppliers) {
        suppliers
            .iter()
            .map(|s| {
                let supplier_orders = orders.iter().filter(|o| o.supplier_id == Some(s.id));
                let (orders_count, total_value) =
                    supplier_orders.fold((0, 0.0), |(count, value), o| (count + 1, value + o.total_amount));
                SupplierReportRow {
                    id: s.id,
                    name: s.name.clone(),
                    status: s.status,
                    rating: s.rating,
                    payment_terms: s.payment_terms,
                    products_count: products.iter().filter(|p| p.supplier_id == Some(s.id)).count(),
                    orders_count,
                    total_value,
                }
            })
            .collect()
    } else {
        Vec::new()
    };

    let warehouse_rows = if filters.report_type.includes(ReportType::Warehouses) {
        warehouses
            .iter()
            .map(|w| {
                let stocked: Vec<&&Product> = products.iter().filter(|p| p.warehouse_id == Some(w.id)).collect();
                WarehouseReportRow {
                    id: w.id,
                    name: w.name.clone(),
                    location: w.location.clone(),
                    status: w.status,
                    capacity: w.capacity,
                    current_occupancy: w.current_occupancy,
                    utilization_rate: w.utilization_rate(),
                    products_count: stocked.len(),
                    inventory_value: stocked.iter().map(|p| p.inventory_value()).sum(),
                }
            })
            .collect()
    } else {
        Vec::new()
    };

    Ok(Report {
        generated_at: now,
        window,
        filters: filters.clone(),
        stats,
        orders: order_rows,
        products: product_rows,
        suppliers: supplier_rows,
        warehouses: warehouse_rows,
    })
}

/// All-time per-supplier counts for the supplier listing
pub fn summarize_suppliers(suppliers: Vec<Supplier>, products: &[Product], orders: &[Order]) -> Vec<SupplierSummary> {
    suppliers
        .into_iter()
        .map(|supplier| {
            let products_count = products.iter().filter(|p| p.supplier_id == Some(supplier.id)).count();
            let (orders_count, total_value) = orders
                .iter()
                .filter(|o| o.supplier_id == Some(supplier.id))
                .fold((0, 0.0), |(count, value), o| (count + 1, value + o.total_amount));
            SupplierSummary {
                supplier,
                products_count,
                orders_count,
                total_value,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::order::sample_order;
    use crate::models::product::sample_product;
    use crate::models::supplier::sample_supplier;
    use crate::models::warehouse::sample_warehouse;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn custom(start: (i32, u32, u32), end: (i32, u32, u32)) -> ReportFilters {
        ReportFilters {
            time_range: TimeRange::Custom,
            start_date: NaiveDate::from_ymd_opt(start.0, start.1, start.2),
            end_date: NaiveDate::from_ymd_opt(end.0, end.1, end.2),
            ..Default::default()
        }
    }

    fn build(inputs: ReportInputs<'_>, filters: &ReportFilters) -> Report {
        build_report(inputs, filters, utc(2024, 6, 30), Tz::UTC).unwrap()
    }

    fn inputs<'a>(
        orders: &'a [Order],
        products: &'a [Product],
        suppliers: &'a [Supplier],
        warehouses: &'a [Warehouse],
    ) -> ReportInputs<'a> {
        ReportInputs {
            orders,
            products,
            suppliers,
            warehouses,
        }
    }

    #[test]
    fn test_custom_window_excludes_out_of_range_orders() {
        let orders = vec![
            sample_order(100.0, utc(2024, 3, 5), OrderStatus::Pending),
            sample_order(200.0, utc(2024, 4, 20), OrderStatus::Pending),
        ];
        let report = build(inputs(&orders, &[], &[], &[]), &custom((2024, 3, 1), (2024, 3, 31)));

        assert_eq!(report.stats.total_orders, 1);
        assert_eq!(report.stats.total_revenue, 100.0);
        assert_eq!(report.stats.average_order_value, 100.0);
        assert_eq!(report.orders.len(), 1);
    }

    #[test]
    fn test_average_is_zero_without_orders() {
        let report = build(inputs(&[], &[], &[], &[]), &ReportFilters::default());
        assert_eq!(report.stats.total_orders, 0);
        assert_eq!(report.stats.average_order_value, 0.0);
        assert_eq!(report.stats.average_warehouse_utilization, 0.0);
    }

    #[test]
    fn test_pending_and_completed_counts() {
        let day = utc(2024, 6, 10);
        let orders: Vec<Order> = OrderStatus::ALL
            .into_iter()
            .map(|status| sample_order(10.0, day, status))
            .collect();
        let report = build(inputs(&orders, &[], &[], &[]), &ReportFilters::default());

        assert_eq!(report.stats.total_orders, 9);
        // draft, pending, confirmed, processing
        assert_eq!(report.stats.pending_orders, 4);
        // delivered, completed
        assert_eq!(report.stats.completed_orders, 2);
        assert!((report.stats.average_order_value - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_stock_buckets_are_exhaustive_and_exclusive() {
        let products = vec![
            sample_product("A", 0, 0, 0),
            sample_product("B", 0, 0, 50),
            sample_product("C", 5, 0, 10),
            sample_product("D", 3, 0, 10),
            sample_product("E", 40, 0, 10),
            sample_product("F", 12, 12, 5),
        ];
        let report = build(inputs(&[], &products, &[], &[]), &ReportFilters::default());
        let stats = &report.stats;

        assert_eq!(stats.out_of_stock + stats.low_stock + stats.in_stock, products.len());
        assert_eq!(stats.out_of_stock, 3);
        assert_eq!(stats.low_stock, 2);
        assert_eq!(stats.in_stock, 1);

        let bucket = |sku: &str| report.products.iter().find(|p| p.sku == sku).unwrap().stock_status;
        assert_eq!(bucket("C"), ReportStockBucket::LowStock);
        assert_eq!(bucket("D"), ReportStockBucket::LowStock);
    }

    #[test]
    fn test_product_stats_ignore_time_window() {
        let products = vec![sample_product("OLD", 4, 0, 1)];
        let report = build(inputs(&[], &products, &[], &[]), &custom((2030, 1, 1), (2030, 1, 2)));
        assert_eq!(report.stats.total_products, 1);
        assert_eq!(report.stats.total_inventory_value, 40.0);
    }

    #[test]
    fn test_supplier_join_counts_windowed_orders() {
        let acme = sample_supplier("Acme");
        let mut idle = sample_supplier("Idle");
        idle.status = SupplierStatus::Inactive;

        let mut in_window = sample_order(120.0, utc(2024, 6, 3), OrderStatus::Confirmed);
        in_window.supplier_id = Some(acme.id);
        let mut also_in_window = sample_order(30.0, utc(2024, 6, 4), OrderStatus::Completed);
        also_in_window.supplier_id = Some(acme.id);
        let mut last_year = sample_order(999.0, utc(2023, 6, 4), OrderStatus::Completed);
        last_year.supplier_id = Some(acme.id);

        let mut widget = sample_product("W-1", 10, 0, 1);
        widget.supplier_id = Some(acme.id);

        let orders = vec![in_window, also_in_window, last_year];
        let products = vec![widget];
        let suppliers = vec![acme.clone(), idle];
        let report = build(inputs(&orders, &products, &suppliers, &[]), &ReportFilters::default());

        let row = report.suppliers.iter().find(|s| s.id == acme.id).unwrap();
        assert_eq!(row.orders_count, 2);
        assert!((row.total_value - 150.0).abs() < 1e-9);
        assert_eq!(row.products_count, 1);
        assert_eq!(row.payment_terms.as_days(), 30);
        assert_eq!(report.stats.total_suppliers, 2);
        assert_eq!(report.stats.active_suppliers, 1);
    }

    #[test]
    fn test_warehouse_rows_and_average_utilization() {
        let main = sample_warehouse("Main", 200, 50);
        let empty = sample_warehouse("Empty", 0, 0);
        let mut stocked = sample_product("S-1", 3, 0, 1);
        stocked.warehouse_id = Some(main.id);

        let products = vec![stocked];
        let warehouses = vec![main.clone(), empty];
        let report = build(inputs(&[], &products, &[], &warehouses), &ReportFilters::default());

        let row = report.warehouses.iter().find(|w| w.id == main.id).unwrap();
        assert_eq!(row.utilization_rate, 25.0);
        assert_eq!(row.products_count, 1);
        assert_eq!(row.inventory_value, 30.0);
        assert!((report.stats.average_warehouse_utilization - 12.5).abs() < 1e-9);
    }

    #[test]
    fn test_warehouse_filter_narrows_everything() {
        let main = sample_warehouse("Main", 100, 10);
        let other = sample_warehouse("Other", 100, 90);

        let mut here = sample_order(50.0, utc(2024, 6, 5), OrderStatus::Pending);
        here.warehouse_id = Some(main.id);
        let mut there = sample_order(70.0, utc(2024, 6, 5), OrderStatus::Pending);
        there.warehouse_id = Some(other.id);
        let mut product = sample_product("P", 5, 0, 1);
        product.warehouse_id = Some(main.id);

        let orders = vec![here, there];
        let products = vec![product, sample_product("Q", 5, 0, 1)];
        let warehouses = vec![main.clone(), other];
        let filters = ReportFilters {
            warehouse_id: Some(main.id),
            ..Default::default()
        };
        let report = build(inputs(&orders, &products, &[], &warehouses), &filters);

        assert_eq!(report.stats.total_orders, 1);
        assert_eq!(report.stats.total_revenue, 50.0);
        assert_eq!(report.stats.total_products, 1);
        assert_eq!(report.warehouses.len(), 1);
        assert_eq!(report.stats.average_warehouse_utilization, 10.0);
    }

    #[test]
    fn test_report_type_limits_tables_but_not_stats() {
        let orders = vec![sample_order(10.0, utc(2024, 6, 5), OrderStatus::Pending)];
        let products = vec![sample_product("P", 5, 0, 1)];
        let filters = ReportFilters {
            report_type: ReportType::Products,
            ..Default::default()
        };
        let report = build(inputs(&orders, &products, &[], &[]), &filters);

        assert!(report.orders.is_empty());
        assert_eq!(report.products.len(), 1);
        assert_eq!(report.stats.total_orders, 1);
    }

    #[test]
    fn test_order_rows_resolve_names() {
        let acme = sample_supplier("Acme");
        let mut order = sample_order(10.0, utc(2024, 6, 5), OrderStatus::Pending);
        order.supplier_id = Some(acme.id);
        order.warehouse_id = Some(Uuid::new_v4());

        let orders = vec![order];
        let suppliers = vec![acme];
        let report = build(inputs(&orders, &[], &suppliers, &[]), &ReportFilters::default());

        assert_eq!(report.orders[0].supplier_name.as_deref(), Some("Acme"));
        assert_eq!(report.orders[0].warehouse_name, None);
    }

    #[test]
    fn test_summarize_suppliers_counts_all_time() {
        let acme = sample_supplier("Acme");
        let mut old = sample_order(40.0, utc(2019, 1, 1), OrderStatus::Completed);
        old.supplier_id = Some(acme.id);
        let mut product = sample_product("P", 1, 0, 0);
        product.supplier_id = Some(acme.id);

        let summaries = summarize_suppliers(vec![acme.clone()], &[product], &[old]);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].supplier, acme);
        assert_eq!(summaries[0].orders_count, 1);
        assert_eq!(summaries[0].products_count, 1);
        assert_eq!(summaries[0].total_value, 40.0);
    }
}
