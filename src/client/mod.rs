//! Typed client for the dashboard API.
//!
//! `EntityProvider` keeps one entity list in sync with the server, `Dashboard` loads the
//! four lists the screens need, and `ReportsAggregator` derives reports from them locally.

pub mod api;
pub mod dashboard;
pub mod provider;

pub use api::{ApiClient, ClientError, ExportDownload, TokenStore};
pub use dashboard::{Dashboard, ReportsAggregator};
pub use provider::{
    EntityProvider, OrderItemProvider, OrderProvider, ProductProvider, Resource, SupplierProvider, WarehouseProvider,
};
