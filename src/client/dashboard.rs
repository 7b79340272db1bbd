use chrono::Utc;
use chrono_tz::Tz;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::api::{ApiClient, ClientError};
use super::provider::{OrderProvider, ProductProvider, SupplierProvider, WarehouseProvider};
use crate::models::SupplierSummary;
use crate::reports::{
    build_report, export_file_name, export_string, summarize_suppliers, ExportScope, Report, ReportData, ReportFilters,
};
use crate::types::Role;

/// The four providers the dashboard screens read from
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub orders: OrderProvider,
    pub products: ProductProvider,
    pub suppliers: SupplierProvider,
    pub warehouses: WarehouseProvider,
}

impl Dashboard {
    pub fn new(client: &ApiClient) -> Self {
        Self {
            orders: OrderProvider::new(client.clone()),
            products: ProductProvider::new(client.clone()),
            suppliers: SupplierProvider::new(client.clone()),
            warehouses: WarehouseProvider::new(client.clone()),
        }
    }

    /// Fetch all four lists concurrently; false if any of them failed
    pub async fn load_all(&mut self) -> bool {
        let (orders, products, suppliers, warehouses) = tokio::join!(
            self.orders.fetch_all(),
            self.products.fetch_all(),
            self.suppliers.fetch_all(),
            self.warehouses.fetch_all(),
        );
        orders && products && suppliers && warehouses
    }

    /// First error among the providers, if any
    pub fn error(&self) -> Option<&str> {
        self.orders
            .error()
            .or_else(|| self.products.error())
            .or_else(|| self.suppliers.error())
            .or_else(|| self.warehouses.error())
    }

    pub fn data(&self) -> ReportData {
        ReportData {
            orders: self.orders.items().to_vec(),
            products: self.products.items().to_vec(),
            suppliers: self.suppliers.items().to_vec(),
            warehouses: self.warehouses.items().to_vec(),
        }
    }
}

/// Recomputes the report whenever its filters or source lists change
#[derive(Debug, Clone)]
pub struct ReportsAggregator {
    tz: Tz,
    filters: ReportFilters,
    data: ReportData,
    report: Option<Report>,
    error: Option<String>,
}

impl ReportsAggregator {
    pub fn new(tz: Tz) -> Self {
        let mut aggregator = Self {
            tz,
            filters: ReportFilters::default(),
            data: ReportData::default(),
            report: None,
            error: None,
        };
        aggregator.recompute();
        aggregator
    }

    pub fn filters(&self) -> &ReportFilters {
        &self.filters
    }

    pub fn report(&self) -> Option<&Report> {
        self.report.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_filters(&mut self, filters: ReportFilters) {
        self.filters = filters;
        self.recompute();
    }

    pub fn set_data(&mut self, data: ReportData) {
        self.data = data;
        self.recompute();
    }

    /// An invalid filter (e.g. an incomplete custom range) keeps the previous report
    pub fn recompute(&mut self) {
        match build_report(self.data.inputs(), &self.filters, Utc::now(), self.tz) {
            Ok(report) => {
                self.report = Some(report);
                self.error = None;
            }
            Err(e) => {
                warn!("⚠️ Report not recomputed: {}", e);
                self.error = Some(e.to_string());
            }
        }
    }

    /// Suppliers with product and order counts derived from the loaded lists
    pub fn supplier_summaries(&self) -> Vec<SupplierSummary> {
        summarize_suppliers(self.data.suppliers.clone(), &self.data.products, &self.data.orders)
    }

    /// Write the current report to `dir` as `<scope>-report-<date>.json`
    pub async fn export_to_file(&self, role: Role, scope: ExportScope, dir: &Path) -> Result<PathBuf, ClientError> {
        if !role.can_export() {
            return Err(ClientError::PermissionDenied);
        }
        let report = self
            .report
            .as_ref()
            .ok_or_else(|| ClientError::Validation("No report to export".to_string()))?;

        let body = export_string(report, scope).map_err(|e| ClientError::Decode(e.to_string()))?;
        let path = dir.join(export_file_name(scope, report.generated_at));
        tokio::fs::write(&path, body).await?;
        info!("📤 Report exported to {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::api::TokenStore;
    use crate::models::order::sample_order;
    use crate::models::product::sample_product;
    use crate::models::supplier::sample_supplier;
    use crate::models::warehouse::sample_warehouse;
    use crate::models::OrderStatus;
    use crate::reports::TimeRange;
    use crate::testing::{spawn_app, test_state, token_for};

    fn sample_data() -> ReportData {
        let supplier = sample_supplier("Acme");
        let mut product = sample_product("AGG-1", 10, 0, 2);
        product.supplier_id = Some(supplier.id);
        let mut order = sample_order(120.0, Utc::now(), OrderStatus::Delivered);
        order.supplier_id = Some(supplier.id);
        ReportData {
            orders: vec![order],
            products: vec![product],
            suppliers: vec![supplier],
            warehouses: vec![sample_warehouse("Main", 100, 40)],
        }
    }

    #[test]
    fn test_aggregator_recomputes_on_new_data() {
        let mut aggregator = ReportsAggregator::new(Tz::UTC);
        assert_eq!(aggregator.report().map(|r| r.stats.total_orders), Some(0));

        aggregator.set_data(sample_data());
        let stats = &aggregator.report().unwrap().stats;
        assert_eq!(stats.total_orders, 1);
        assert_eq!(stats.total_revenue, 120.0);
        assert_eq!(stats.in_stock, 1);
        assert_eq!(stats.average_warehouse_utilization, 40.0);

        let summaries = aggregator.supplier_summaries();
        assert_eq!(summaries[0].products_count, 1);
        assert_eq!(summaries[0].orders_count, 1);
    }

    #[test]
    fn test_invalid_filters_keep_previous_report() {
        let mut aggregator = ReportsAggregator::new(Tz::UTC);
        aggregator.set_data(sample_data());

        aggregator.set_filters(ReportFilters {
            time_range: TimeRange::Custom,
            ..Default::default()
        });
        assert_eq!(
            aggregator.error(),
            Some("Custom time range requires both startDate and endDate")
        );
        assert_eq!(aggregator.report().map(|r| r.stats.total_orders), Some(1));
    }

    #[tokio::test]
    async fn test_export_to_file_checks_role() {
        let dir = tempfile::tempdir().unwrap();
        let mut aggregator = ReportsAggregator::new(Tz::UTC);
        aggregator.set_data(sample_data());

        let denied = aggregator.export_to_file(Role::Staff, ExportScope::All, dir.path()).await;
        assert!(matches!(denied, Err(ClientError::PermissionDenied)));

        let path = aggregator
            .export_to_file(Role::Manager, ExportScope::Products, dir.path())
            .await
            .unwrap();
        assert!(path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("products-report-")));

        let written: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written[0]["sku"], "AGG-1");
    }

    #[tokio::test]
    async fn test_dashboard_loads_all_lists() {
        let state = test_state(10);
        let (_, token) = token_for(&state, Role::Admin);
        state
            .repos
            .products
            .insert(sample_product("DSH-1", 0, 0, 1))
            .await
            .unwrap();
        state.repos.suppliers.insert(sample_supplier("Globex")).await.unwrap();
        let client = ApiClient::new(spawn_app(state).await, TokenStore::new(Some(token)));

        let mut dashboard = Dashboard::new(&client);
        assert!(dashboard.load_all().await);
        assert!(dashboard.error().is_none());
        assert_eq!(dashboard.products.items().len(), 1);
        assert_eq!(dashboard.suppliers.items()[0].name, "Globex");

        let mut aggregator = ReportsAggregator::new(Tz::UTC);
        aggregator.set_data(dashboard.data());
        assert_eq!(aggregator.report().unwrap().stats.out_of_stock, 1);

        let download = client
            .download_export(aggregator.filters(), ExportScope::Suppliers)
            .await
            .unwrap();
        assert!(download
            .file_name
            .is_some_and(|name| name.starts_with("suppliers-report-")));
        let rows: serde_json::Value = serde_json::from_str(&download.body).unwrap();
        assert_eq!(rows[0]["name"], "Globex");
    }
}
