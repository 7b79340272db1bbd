use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Report;

/// Which part of a report is exported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportScope {
    #[default]
    All,
    Orders,
    Products,
    Suppliers,
    Warehouses,
}

impl ExportScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportScope::All => "all",
            ExportScope::Orders => "orders",
            ExportScope::Products => "products",
            ExportScope::Suppliers => "suppliers",
            ExportScope::Warehouses => "warehouses",
        }
    }
}

/// `All` exports the whole report (stats included); other scopes export their table as an array
pub fn export_json(report: &Report, scope: ExportScope) -> Result<Value, serde_json::Error> {
    match scope {
        ExportScope::All => serde_json::to_value(report),
        ExportScope::Orders => serde_json::to_value(&report.orders),
        ExportScope::Products => serde_json::to_value(&report.products),
        ExportScope::Suppliers => serde_json::to_value(&report.suppliers),
        ExportScope::Warehouses => serde_json::to_value(&report.warehouses),
    }
}

/// Pretty-printed export body
pub fn export_string(report: &Report, scope: ExportScope) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&export_json(report, scope)?)
}

/// `<scope>-report-<YYYY-MM-DD>.json`
pub fn export_file_name(scope: ExportScope, at: DateTime<Utc>) -> String {
    format!("{}-report-{}.json", scope.as_str(), at.format("%Y-%m-%d"))
}
