//! Derived dashboard metrics.
//!
//! Everything here is a pure reduction over already-loaded entity lists, shared by the
//! `/api/reports` handlers and the client-side `ReportsAggregator`.

pub mod aggregate;
pub mod export;
pub mod range;

pub use aggregate::{
    build_report, summarize_suppliers, DashboardStats, OrderReportRow, ProductReportRow, Report, ReportData,
    ReportFilters, ReportInputs, ReportStockBucket, ReportType, SupplierReportRow, WarehouseReportRow,
};
pub use export::{export_file_name, export_json, export_string, ExportScope};
pub use range::{report_window, DateWindow, TimeRange};

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ReportError {
    #[error("Custom time range requires both startDate and endDate")]
    MissingCustomRange,

    #[error("endDate must not be before startDate")]
    InvertedRange,

    #[error("Report dates must fall between the years 1 and 9999")]
    OutOfRange,
}
