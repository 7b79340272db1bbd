use async_trait::async_trait;
use tiberius::Row;
use uuid::Uuid;

use super::{read_datetime, read_f64, read_i32, read_uuid, SqlStore, WhereClause};
use crate::error::StoreError;
use crate::models::{OrderItem, OrderItemFilter};
use crate::repository::Repository;

const ORDER_ITEM_COLUMNS: &str = "id, order_id, product_id, quantity, unit_price, created_at, updated_at";

fn order_item_from_row(row: &Row) -> Result<OrderItem, StoreError> {
    Ok(OrderItem {
        id: read_uuid(row, "id")?,
        order_id: read_uuid(row, "order_id")?,
        product_id: read_uuid(row, "product_id")?,
        quantity: read_i32(row, "quantity"),
        unit_price: read_f64(row, "unit_price"),
        created_at: read_datetime(row, "created_at"),
        updated_at: read_datetime(row, "updated_at"),
    })
}

#[async_trait]
impl Repository<OrderItem> for SqlStore {
    async fn list(&self, filter: &OrderItemFilter) -> Result<Vec<OrderItem>, StoreError> {
        let mut client = self.db.get_client().await?;

        let mut clause = WhereClause::new();
        if let Some(id) = &filter.order_id {
            clause.eq("order_id", id);
        }
        if let Some(id) = &filter.product_id {
            clause.eq("product_id", id);
        }

        let query = format!(
            "SELECT {ORDER_ITEM_COLUMNS} FROM order_items{} ORDER BY created_at",
            clause.sql()
        );
        let rows = client.query(query, clause.params()).await?.into_first_result().await?;

        rows.iter().map(order_item_from_row).collect()
    }

    async fn get(&self, id: Uuid) -> Result<Option<OrderItem>, StoreError> {
        let mut client = self.db.get_client().await?;

        let query = format!("SELECT {ORDER_ITEM_COLUMNS} FROM order_items WHERE id = @P1");
        let row = client.query(query, &[&id]).await?.into_row().await?;

        row.as_ref().map(order_item_from_row).transpose()
    }

    async fn insert(&self, item: OrderItem) -> Result<OrderItem, StoreError> {
        let mut client = self.db.get_client().await?;

        let query = format!(
            "INSERT INTO order_items ({ORDER_ITEM_COLUMNS}) VALUES (@P1, @P2, @P3, @P4, @P5, @P6, @P7)"
        );

        let created_at = item.created_at.naive_utc();
        let updated_at = item.updated_at.naive_utc();
        client
            .execute(
                query,
                &[
                    &item.id,
                    &item.order_id,
                    &item.product_id,
                    &item.quantity,
                    &item.unit_price,
                    &created_at,
                    &updated_at,
                ],
            )
            .await?;

        Ok(item)
    }

    async fn save(&self, item: OrderItem) -> Result<OrderItem, StoreError> {
        let mut client = self.db.get_client().await?;

        let query = r#"
            UPDATE order_items SET quantity = @P2, unit_price = @P3, updated_at = @P4
            WHERE id = @P1
        "#;

        let updated_at = item.updated_at.naive_utc();
        let result = client
            .execute(query, &[&item.id, &item.quantity, &item.unit_price, &updated_at])
            .await?;

        if result.total() == 0 {
            return Err(StoreError::NotFound {
                entity: "Order item",
                id: item.id.to_string(),
            });
        }
        Ok(item)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut client = self.db.get_client().await?;
        let result = client.execute("DELETE FROM order_items WHERE id = @P1", &[&id]).await?;
        Ok(result.total() > 0)
    }
}
