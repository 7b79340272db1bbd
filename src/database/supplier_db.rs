use async_trait::async_trait;
use tiberius::Row;
use uuid::Uuid;

use super::{read_datetime, read_f64, read_i32, read_opt_string, read_string, read_uuid, SqlStore, WhereClause};
use crate::error::StoreError;
use crate::models::{PaymentTerms, Supplier, SupplierFilter, SupplierStatus};
use crate::repository::Repository;

const SUPPLIER_COLUMNS: &str = r#"
    id, name, contact_person, email, phone, address, status, rating,
    credit_limit, current_balance, payment_terms, created_at, updated_at
"#;

fn supplier_from_row(row: &Row) -> Result<Supplier, StoreError> {
    let status = read_string(row, "status");
    let terms = u16::try_from(read_i32(row, "payment_terms")).map(PaymentTerms::days).unwrap_or_default();
    Ok(Supplier {
        id: read_uuid(row, "id")?,
        name: read_string(row, "name"),
        contact_person: read_opt_string(row, "contact_person"),
        email: read_opt_string(row, "email"),
        phone: read_opt_string(row, "phone"),
        address: read_opt_string(row, "address"),
        status: SupplierStatus::parse(&status)
            .ok_or_else(|| StoreError::Database(format!("Unknown supplier status '{status}'")))?,
        rating: read_f64(row, "rating"),
        credit_limit: read_f64(row, "credit_limit"),
        current_balance: read_f64(row, "current_balance"),
        payment_terms: terms,
        created_at: read_datetime(row, "created_at"),
        updated_at: read_datetime(row, "updated_at"),
    })
}

#[async_trait]
impl Repository<Supplier> for SqlStore {
    async fn list(&self, filter: &SupplierFilter) -> Result<Vec<Supplier>, StoreError> {
        let mut client = self.db.get_client().await?;

        let status = filter.status.map(|s| s.as_str());
        let mut clause = WhereClause::new();
        if let Some(status) = &status {
            clause.eq("status", status);
        }

        let query = format!("SELECT {SUPPLIER_COLUMNS} FROM suppliers{} ORDER BY name", clause.sql());
        let rows = client.query(query, clause.params()).await?.into_first_result().await?;

        rows.iter().map(supplier_from_row).collect()
    }

    async fn get(&self, id: Uuid) -> Result<Option<Supplier>, StoreError> {
        let mut client = self.db.get_client().await?;

        let query = format!("SELECT {SUPPLIER_COLUMNS} FROM suppliers WHERE id = @P1");
        let row = client.query(query, &[&id]).await?.into_row().await?;

        row.as_ref().map(supplier_from_row).transpose()
    }

    async fn insert(&self, supplier: Supplier) -> Result<Supplier, StoreError> {
        let mut client = self.db.get_client().await?;

        let query = r#"
            INSERT INTO suppliers (
                id, name, contact_person, email, phone, address, status, rating,
                credit_limit, current_balance, payment_terms, created_at, updated_at
            ) VALUES (@P1, @P2, @P3, @P4, @P5, @P6, @P7, @P8, @P9, @P10, @P11, @P12, @P13)
        "#;

        let terms = i32::from(supplier.payment_terms.as_days());
        let created_at = supplier.created_at.naive_utc();
        let updated_at = supplier.updated_at.naive_utc();
        client
            .execute(
                query,
                &[
                    &supplier.id,
                    &supplier.name.as_str(),
                    &supplier.contact_person.as_deref(),
                    &supplier.email.as_deref(),
                    &supplier.phone.as_deref(),
                    &supplier.address.as_deref(),
                    &supplier.status.as_str(),
                    &supplier.rating,
                    &supplier.credit_limit,
                    &supplier.current_balance,
                    &terms,
                    &created_at,
                    &updated_at,
                ],
            )
            .await?;

        Ok(supplier)
    }

    async fn save(&self, supplier: Supplier) -> Result<Supplier, StoreError> {
        let mut client = self.db.get_client().await?;

        let query = r#"
            UPDATE suppliers SET
                name = @P2, contact_person = @P3, email = @P4, phone = @P5, address = @P6,
                status = @P7, rating = @P8, credit_limit = @P9, current_balance = @P10,
                payment_terms = @P11, updated_at = @P12
            WHERE id = @P1
        "#;

        let terms = i32::from(supplier.payment_terms.as_days());
        let updated_at = supplier.updated_at.naive_utc();
        let result = client
            .execute(
                query,
                &[
                    &supplier.id,
                    &supplier.name.as_str(),
                    &supplier.contact_person.as_deref(),
                    &supplier.email.as_deref(),
                    &supplier.phone.as_deref(),
                    &supplier.address.as_deref(),
                    &supplier.status.as_str(),
                    &supplier.rating,
                    &supplier.credit_limit,
                    &supplier.current_balance,
                    &terms,
                    &updated_at,
                ],
            )
            .await?;

        if result.total() == 0 {
            return Err(StoreError::NotFound {
                entity: "Supplier",
                id: supplier.id.to_string(),
            });
        }
        Ok(supplier)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut client = self.db.get_client().await?;
        let result = client.execute("DELETE FROM suppliers WHERE id = @P1", &[&id]).await?;
        Ok(result.total() > 0)
    }
}
