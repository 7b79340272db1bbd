use async_trait::async_trait;
use tiberius::Row;
use uuid::Uuid;

use super::{
    read_bool, read_datetime, read_f64, read_opt_datetime, read_opt_string, read_opt_uuid, read_string, read_uuid,
    SqlStore, WhereClause,
};
use crate::error::StoreError;
use crate::models::{Order, OrderFilter, OrderPriority, OrderStatus, OrderType, PaymentStatus};
use crate::repository::Repository;

const ORDER_COLUMNS: &str = r#"
    id, order_number, status, order_type, payment_status, supplier_id, warehouse_id, user_id,
    subtotal, tax_amount, shipping_cost, discount_amount, total_amount, paid_amount,
    order_date, due_date, shipped_date, delivered_date, priority, is_rush_order, notes,
    created_at, updated_at
"#;

fn parse_column<T>(row: &Row, column: &str, parse: fn(&str) -> Option<T>) -> Result<T, StoreError> {
    let value = read_string(row, column);
    parse(&value).ok_or_else(|| StoreError::Database(format!("Unknown {column} '{value}'")))
}

fn order_from_row(row: &Row) -> Result<Order, StoreError> {
    Ok(Order {
        id: read_uuid(row, "id")?,
        order_number: read_string(row, "order_number"),
        status: parse_column(row, "status", OrderStatus::parse)?,
        order_type: parse_column(row, "order_type", OrderType::parse)?,
        payment_status: parse_column(row, "payment_status", PaymentStatus::parse)?,
        supplier_id: read_opt_uuid(row, "supplier_id"),
        warehouse_id: read_opt_uuid(row, "warehouse_id"),
        user_id: read_opt_uuid(row, "user_id"),
        subtotal: read_f64(row, "subtotal"),
        tax_amount: read_f64(row, "tax_amount"),
        shipping_cost: read_f64(row, "shipping_cost"),
        discount_amount: read_f64(row, "discount_amount"),
        total_amount: read_f64(row, "total_amount"),
        paid_amount: read_f64(row, "paid_amount"),
        order_date: read_datetime(row, "order_date"),
        due_date: read_opt_datetime(row, "due_date"),
        shipped_date: read_opt_datetime(row, "shipped_date"),
        delivered_date: read_opt_datetime(row, "delivered_date"),
        priority: parse_column(row, "priority", OrderPriority::parse)?,
        is_rush_order: read_bool(row, "is_rush_order"),
        notes: read_opt_string(row, "notes"),
        created_at: read_datetime(row, "created_at"),
        updated_at: read_datetime(row, "updated_at"),
    })
}

#[async_trait]
impl Repository<Order> for SqlStore {
    async fn list(&self, filter: &OrderFilter) -> Result<Vec<Order>, StoreError> {
        let mut client = self.db.get_client().await?;

        let status = filter.status.map(|s| s.as_str());
        let mut clause = WhereClause::new();
        if let Some(status) = &status {
            clause.eq("status", status);
        }
        if let Some(id) = &filter.supplier_id {
            clause.eq("supplier_id", id);
        }
        if let Some(id) = &filter.warehouse_id {
            clause.eq("warehouse_id", id);
        }
        if let Some(id) = &filter.user_id {
            clause.eq("user_id", id);
        }

        let query = format!(
            "SELECT {ORDER_COLUMNS} FROM orders{} ORDER BY order_date DESC, order_number",
            clause.sql()
        );
        let rows = client.query(query, clause.params()).await?.into_first_result().await?;

        rows.iter().map(order_from_row).collect()
    }

    async fn get(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
        let mut client = self.db.get_client().await?;

        let query = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = @P1");
        let row = client.query(query, &[&id]).await?.into_row().await?;

        row.as_ref().map(order_from_row).transpose()
    }

    async fn insert(&self, order: Order) -> Result<Order, StoreError> {
        let mut client = self.db.get_client().await?;

        let query = r#"
            INSERT INTO orders (
                id, order_number, status, order_type, payment_status, supplier_id, warehouse_id, user_id,
                subtotal, tax_amount, shipping_cost, discount_amount, total_amount, paid_amount,
                order_date, due_date, shipped_date, delivered_date, priority, is_rush_order, notes,
                created_at, updated_at
            ) VALUES (
                @P1, @P2, @P3, @P4, @P5, @P6, @P7, @P8, @P9, @P10, @P11, @P12,
                @P13, @P14, @P15, @P16, @P17, @P18, @P19, @P20, @P21, @P22, @P23
            )
        "#;

        let order_date = order.order_date.naive_utc();
        let due_date = order.due_date.map(|d| d.naive_utc());
        let shipped_date = order.shipped_date.map(|d| d.naive_utc());
        let delivered_date = order.delivered_date.map(|d| d.naive_utc());
        let created_at = order.created_at.naive_utc();
        let updated_at = order.updated_at.naive_utc();
        client
            .execute(
                query,
                &[
                    &order.id,
                    &order.order_number.as_str(),
                    &order.status.as_str(),
                    &order.order_type.as_str(),
                    &order.payment_status.as_str(),
                    &order.supplier_id,
                    &order.warehouse_id,
                    &order.user_id,
                    &order.subtotal,
                    &order.tax_amount,
                    &order.shipping_cost,
                    &order.discount_amount,
                    &order.total_amount,
                    &order.paid_amount,
                    &order_date,
                    &due_date,
                    &shipped_date,
                    &delivered_date,
                    &order.priority.as_str(),
                    &order.is_rush_order,
                    &order.notes.as_deref(),
                    &created_at,
                    &updated_at,
                ],
            )
            .await?;

        Ok(order)
    }

    async fn save(&self, order: Order) -> Result<Order, StoreError> {
        let mut client = self.db.get_client().await?;

        let query = r#"
            UPDATE orders SET
                order_number = @P2, status = @P3, order_type = @P4, payment_status = @P5,
                supplier_id = @P6, warehouse_id = @P7, user_id = @P8,
                subtotal = @P9, tax_amount = @P10, shipping_cost = @P11, discount_amount = @P12,
                total_amount = @P13, paid_amount = @P14, order_date = @P15, due_date = @P16,
                shipped_date = @P17, delivered_date = @P18, priority = @P19, is_rush_order = @P20,
                notes = @P21, updated_at = @P22
            WHERE id = @P1
        "#;

        let order_date = order.order_date.naive_utc();
        let due_date = order.due_date.map(|d| d.naive_utc());
        let shipped_date = order.shipped_date.map(|d| d.naive_utc());
        let delivered_date = order.delivered_date.map(|d| d.naive_utc());
        let updated_at = order.updated_at.naive_utc();
        let result = client
            .execute(
                query,
                &[
                    &order.id,
                    &order.order_number.as_str(),
                    &order.status.as_str(),
                    &order.order_type.as_str(),
                    &order.payment_status.as_str(),
                    &order.supplier_id,
                    &order.warehouse_id,
                    &order.user_id,
                    &order.subtotal,
                    &order.tax_amount,
                    &order.shipping_cost,
                    &order.discount_amount,
                    &order.total_amount,
                    &order.paid_amount,
                    &order_date,
                    &due_date,
                    &shipped_date,
                    &delivered_date,
                    &order.priority.as_str(),
                    &order.is_rush_order,
                    &order.notes.as_deref(),
                    &updated_at,
                ],
            )
            .await?;

        if result.total() == 0 {
            return Err(StoreError::NotFound {
                entity: "Order",
                id: order.id.to_string(),
            });
        }
        Ok(order)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut client = self.db.get_client().await?;
        let result = client.execute("DELETE FROM orders WHERE id = @P1", &[&id]).await?;
        Ok(result.total() > 0)
    }
}
