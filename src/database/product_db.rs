use async_trait::async_trait;
use tiberius::Row;
use uuid::Uuid;

use super::{
    read_datetime, read_f64, read_i32, read_opt_string, read_opt_uuid, read_string, read_uuid, SqlStore,
    WhereClause,
};
use crate::error::StoreError;
use crate::models::{Product, ProductFilter, ProductStatus};
use crate::repository::Repository;

const PRODUCT_COLUMNS: &str = r#"
    id, sku, name, description, price, cost_price, quantity, reserved_quantity,
    min_stock_level, max_stock_level, category, supplier_id, warehouse_id,
    total_sold, total_revenue, status, created_at, updated_at
"#;

fn product_from_row(row: &Row) -> Result<Product, StoreError> {
    let status = read_string(row, "status");
    Ok(Product {
        id: read_uuid(row, "id")?,
        sku: read_string(row, "sku"),
        name: read_string(row, "name"),
        description: read_opt_string(row, "description"),
        price: read_f64(row, "price"),
        cost_price: read_f64(row, "cost_price"),
        quantity: read_i32(row, "quantity"),
        reserved_quantity: read_i32(row, "reserved_quantity"),
        min_stock_level: read_i32(row, "min_stock_level"),
        max_stock_level: read_i32(row, "max_stock_level"),
        category: read_opt_string(row, "category"),
        supplier_id: read_opt_uuid(row, "supplier_id"),
        warehouse_id: read_opt_uuid(row, "warehouse_id"),
        total_sold: read_i32(row, "total_sold"),
        total_revenue: read_f64(row, "total_revenue"),
        status: ProductStatus::parse(&status)
            .ok_or_else(|| StoreError::Database(format!("Unknown product status '{status}'")))?,
        created_at: read_datetime(row, "created_at"),
        updated_at: read_datetime(row, "updated_at"),
    })
}

#[async_trait]
impl Repository<Product> for SqlStore {
    async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, StoreError> {
        let mut client = self.db.get_client().await?;

        let status = filter.status.map(|s| s.as_str());
        let mut clause = WhereClause::new();
        if let Some(sku) = &filter.sku {
            clause.eq("sku", sku);
        }
        if let Some(id) = &filter.supplier_id {
            clause.eq("supplier_id", id);
        }
        if let Some(id) = &filter.warehouse_id {
            clause.eq("warehouse_id", id);
        }
        if let Some(category) = &filter.category {
            clause.eq("category", category);
        }
        if let Some(status) = &status {
            clause.eq("status", status);
        }

        let query = format!("SELECT {PRODUCT_COLUMNS} FROM products{} ORDER BY created_at, sku", clause.sql());
        let rows = client.query(query, clause.params()).await?.into_first_result().await?;

        rows.iter().map(product_from_row).collect()
    }

    async fn get(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        let mut client = self.db.get_client().await?;

        let query = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = @P1");
        let row = client.query(query, &[&id]).await?.into_row().await?;

        row.as_ref().map(product_from_row).transpose()
    }

    async fn insert(&self, product: Product) -> Result<Product, StoreError> {
        let mut client = self.db.get_client().await?;

        let query = r#"
            INSERT INTO products (
                id, sku, name, description, price, cost_price, quantity, reserved_quantity,
                min_stock_level, max_stock_level, category, supplier_id, warehouse_id,
                total_sold, total_revenue, status, created_at, updated_at
            ) VALUES (@P1, @P2, @P3, @P4, @P5, @P6, @P7, @P8, @P9, @P10, @P11, @P12, @P13, @P14, @P15, @P16, @P17, @P18)
        "#;

        let created_at = product.created_at.naive_utc();
        let updated_at = product.updated_at.naive_utc();
        client
            .execute(
                query,
                &[
                    &product.id,
                    &product.sku.as_str(),
                    &product.name.as_str(),
                    &product.description.as_deref(),
                    &product.price,
                    &product.cost_price,
                    &product.quantity,
                    &product.reserved_quantity,
                    &product.min_stock_level,
                    &product.max_stock_level,
                    &product.category.as_deref(),
                    &product.supplier_id,
                    &product.warehouse_id,
                    &product.total_sold,
                    &product.total_revenue,
                    &product.status.as_str(),
                    &created_at,
                    &updated_at,
                ],
            )
            .await?;

        Ok(product)
    }

    async fn save(&self, product: Product) -> Result<Product, StoreError> {
        let mut client = self.db.get_client().await?;

        let query = r#"
            UPDATE products SET
                sku = @P2, name = @P3, description = @P4, price = @P5, cost_price = @P6,
                quantity = @P7, reserved_quantity = @P8, min_stock_level = @P9, max_stock_level = @P10,
                category = @P11, supplier_id = @P12, warehouse_id = @P13, total_sold = @P14,
                total_revenue = @P15, status = @P16, updated_at = @P17
            WHERE id = @P1
        "#;

        let updated_at = product.updated_at.naive_utc();
        let result = client
            .execute(
                query,
                &[
                    &product.id,
                    &product.sku.as_str(),
                    &product.name.as_str(),
                    &product.description.as_deref(),
                    &product.price,
                    &product.cost_price,
                    &product.quantity,
                    &product.reserved_quantity,
                    &product.min_stock_level,
                    &product.max_stock_level,
                    &product.category.as_deref(),
                    &product.supplier_id,
                    &product.warehouse_id,
                    &product.total_sold,
                    &product.total_revenue,
                    &product.status.as_str(),
                    &updated_at,
                ],
            )
            .await?;

        if result.total() == 0 {
            return Err(StoreError::NotFound {
                entity: "Product",
                id: product.id.to_string(),
            });
        }
        Ok(product)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut client = self.db.get_client().await?;
        let result = client.execute("DELETE FROM products WHERE id = @P1", &[&id]).await?;
        Ok(result.total() > 0)
    }
}
