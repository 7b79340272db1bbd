use async_trait::async_trait;
use tiberius::Row;
use uuid::Uuid;

use super::{
    read_datetime, read_i32, read_opt_string, read_opt_uuid, read_string, read_uuid, SqlStore, WhereClause,
};
use crate::error::StoreError;
use crate::models::{Warehouse, WarehouseFilter, WarehouseStatus};
use crate::repository::Repository;

const WAREHOUSE_COLUMNS: &str = r#"
    id, name, location, capacity, current_occupancy, status, manager_id,
    contact_email, contact_phone, created_at, updated_at
"#;

fn warehouse_from_row(row: &Row) -> Result<Warehouse, StoreError> {
    let status = read_string(row, "status");
    Ok(Warehouse {
        id: read_uuid(row, "id")?,
        name: read_string(row, "name"),
        location: read_string(row, "location"),
        capacity: read_i32(row, "capacity"),
        current_occupancy: read_i32(row, "current_occupancy"),
        status: WarehouseStatus::parse(&status)
            .ok_or_else(|| StoreError::Database(format!("Unknown warehouse status '{status}'")))?,
        manager_id: read_opt_uuid(row, "manager_id"),
        contact_email: read_opt_string(row, "contact_email"),
        contact_phone: read_opt_string(row, "contact_phone"),
        created_at: read_datetime(row, "created_at"),
        updated_at: read_datetime(row, "updated_at"),
    })
}

#[async_trait]
impl Repository<Warehouse> for SqlStore {
    async fn list(&self, filter: &WarehouseFilter) -> Result<Vec<Warehouse>, StoreError> {
        let mut client = self.db.get_client().await?;

        let status = filter.status.map(|s| s.as_str());
        let mut clause = WhereClause::new();
        if let Some(id) = &filter.manager_id {
            clause.eq("manager_id", id);
        }
        if let Some(status) = &status {
            clause.eq("status", status);
        }

        let query = format!("SELECT {WAREHOUSE_COLUMNS} FROM warehouses{} ORDER BY name", clause.sql());
        let rows = client.query(query, clause.params()).await?.into_first_result().await?;

        rows.iter().map(warehouse_from_row).collect()
    }

    async fn get(&self, id: Uuid) -> Result<Option<Warehouse>, StoreError> {
        let mut client = self.db.get_client().await?;

        let query = format!("SELECT {WAREHOUSE_COLUMNS} FROM warehouses WHERE id = @P1");
        let row = client.query(query, &[&id]).await?.into_row().await?;

        row.as_ref().map(warehouse_from_row).transpose()
    }

    async fn insert(&self, warehouse: Warehouse) -> Result<Warehouse, StoreError> {
        let mut client = self.db.get_client().await?;

        let query = r#"
            INSERT INTO warehouses (
                id, name, location, capacity, current_occupancy, status, manager_id,
                contact_email, contact_phone, created_at, updated_at
            ) VALUES (@P1, @P2, @P3, @P4, @P5, @P6, @P7, @P8, @P9, @P10, @P11)
        "#;

        let created_at = warehouse.created_at.naive_utc();
        let updated_at = warehouse.updated_at.naive_utc();
        client
            .execute(
                query,
                &[
                    &warehouse.id,
                    &warehouse.name.as_str(),
                    &warehouse.location.as_str(),
                    &warehouse.capacity,
                    &warehouse.current_occupancy,
                    &warehouse.status.as_str(),
                    &warehouse.manager_id,
                    &warehouse.contact_email.as_deref(),
                    &warehouse.contact_phone.as_deref(),
                    &created_at,
                    &updated_at,
                ],
            )
            .await?;

        Ok(warehouse)
    }

    async fn save(&self, warehouse: Warehouse) -> Result<Warehouse, StoreError> {
        let mut client = self.db.get_client().await?;

        let query = r#"
            UPDATE warehouses SET
                name = @P2, location = @P3, capacity = @P4, current_occupancy = @P5, status = @P6,
                manager_id = @P7, contact_email = @P8, contact_phone = @P9, updated_at = @P10
            WHERE id = @P1
        "#;

        let updated_at = warehouse.updated_at.naive_utc();
        let result = client
            .execute(
                query,
                &[
                    &warehouse.id,
                    &warehouse.name.as_str(),
                    &warehouse.location.as_str(),
                    &warehouse.capacity,
                    &warehouse.current_occupancy,
                    &warehouse.status.as_str(),
                    &warehouse.manager_id,
                    &warehouse.contact_email.as_deref(),
                    &warehouse.contact_phone.as_deref(),
                    &updated_at,
                ],
            )
            .await?;

        if result.total() == 0 {
            return Err(StoreError::NotFound {
                entity: "Warehouse",
                id: warehouse.id.to_string(),
            });
        }
        Ok(warehouse)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut client = self.db.get_client().await?;
        let result = client.execute("DELETE FROM warehouses WHERE id = @P1", &[&id]).await?;
        Ok(result.total() > 0)
    }
}
