use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::{debug, instrument};

use crate::error::ApiError;
use crate::models::{OrderFilter, ProductFilter, SupplierFilter, SupplierSummary, WarehouseFilter};
use crate::reports::{build_report, report_window, summarize_suppliers, DateWindow, Report, ReportData, ReportFilters};
use crate::repository::Repositories;

/// Loads entity lists from the repositories and derives reports from them
#[derive(Clone)]
pub struct ReportService {
    repos: Repositories,
    tz: Tz,
}

impl ReportService {
    pub fn new(repos: Repositories, tz: Tz) -> Self {
        Self { repos, tz }
    }

    /// Fetch the four lists concurrently
    pub async fn snapshot(&self) -> Result<ReportData, ApiError> {
        let order_filter = OrderFilter::default();
        let product_filter = ProductFilter::default();
        let supplier_filter = SupplierFilter::default();
        let warehouse_filter = WarehouseFilter::default();
        let (orders, products, suppliers, warehouses) = tokio::try_join!(
            self.repos.orders.list(&order_filter),
            self.repos.products.list(&product_filter),
            self.repos.suppliers.list(&supplier_filter),
            self.repos.warehouses.list(&warehouse_filter),
        )?;
        Ok(ReportData {
            orders,
            products,
            suppliers,
            warehouses,
        })
    }

    /// Validate `filters` and resolve them to a window without loading anything
    pub fn window(&self, filters: &ReportFilters, now: DateTime<Utc>) -> Result<DateWindow, ApiError> {
        Ok(report_window(filters, now, self.tz)?)
    }

    #[instrument(skip(self))]
    pub async fn report(&self, filters: &ReportFilters, now: DateTime<Utc>) -> Result<Report, ApiError> {
        let snapshot = self.snapshot().await?;
        let report = build_report(snapshot.inputs(), filters, now, self.tz)?;
        debug!(
            orders = report.stats.total_orders,
            products = report.stats.total_products,
            "📊 Report computed"
        );
        Ok(report)
    }

    /// Suppliers matching `filter`, with all-time product/order counts
    pub async fn supplier_summaries(&self, filter: &SupplierFilter) -> Result<Vec<SupplierSummary>, ApiError> {
        let product_filter = ProductFilter::default();
        let order_filter = OrderFilter::default();
        let (suppliers, products, orders) = tokio::try_join!(
            self.repos.suppliers.list(filter),
            self.repos.products.list(&product_filter),
            self.repos.orders.list(&order_filter),
        )?;
        Ok(summarize_suppliers(suppliers, &products, &orders))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::order::sample_order;
    use crate::models::supplier::sample_supplier;
    use crate::models::{OrderStatus, SupplierStatus};

    #[tokio::test]
    async fn test_report_reads_from_repositories() {
        let repos = Repositories::in_memory();
        let now = Utc::now();
        repos
            .orders
            .insert(sample_order(80.0, now, OrderStatus::Pending))
            .await
            .unwrap();

        let service = ReportService::new(repos, Tz::UTC);
        let filters = ReportFilters {
            time_range: crate::reports::TimeRange::Today,
            ..Default::default()
        };
        let report = service.report(&filters, now).await.unwrap();

        assert_eq!(report.stats.total_orders, 1);
        assert_eq!(report.stats.total_revenue, 80.0);
    }

    #[tokio::test]
    async fn test_supplier_summaries_respect_filter() {
        let repos = Repositories::in_memory();
        let active = sample_supplier("Active Co");
        let mut pending = sample_supplier("Pending Co");
        pending.status = SupplierStatus::PendingApproval;
        repos.suppliers.insert(active.clone()).await.unwrap();
        repos.suppliers.insert(pending).await.unwrap();

        let mut order = sample_order(25.0, Utc::now(), OrderStatus::Completed);
        order.supplier_id = Some(active.id);
        repos.orders.insert(order).await.unwrap();

        let service = ReportService::new(repos, Tz::UTC);
        let filter = SupplierFilter {
            status: Some(SupplierStatus::Active),
        };
        let summaries = service.supplier_summaries(&filter).await.unwrap();

        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].supplier.id, active.id);
        assert_eq!(summaries[0].orders_count, 1);
    }
}
