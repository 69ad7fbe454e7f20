use async_trait::async_trait;
use sqlx::Postgres;

use pvz_core::{
    PickupPoint, PickupPointId, Product, ProductId, Reception, ReceptionId, ReceptionStatus,
    StoreError, Transaction,
};

use super::rows::{PickupPointRow, ProductRow, ReceptionRow};

/// A `PostgreSQL` transaction. Dropping it without commit rolls back.
pub(super) struct PgTransaction {
    tx: sqlx::Transaction<'static, Postgres>,
}

impl PgTransaction {
    pub(super) const fn new(tx: sqlx::Transaction<'static, Postgres>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl Transaction for PgTransaction {
    async fn insert_pickup_point(&mut self, pickup_point: &PickupPoint) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO pvz (id, registration_date, city) VALUES ($1, $2, $3)")
            .bind(pickup_point.id)
            .bind(pickup_point.registration_date)
            .bind(pickup_point.city.as_str())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn lock_pickup_point(
        &mut self,
        id: PickupPointId,
    ) -> Result<Option<PickupPoint>, StoreError> {
        let row = sqlx::query_as::<_, PickupPointRow>(
            "SELECT id, registration_date, city FROM pvz WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        row.map(PickupPoint::try_from).transpose()
    }

    async fn latest_reception(
        &mut self,
        pickup_point_id: PickupPointId,
    ) -> Result<Option<Reception>, StoreError> {
        let row = sqlx::query_as::<_, ReceptionRow>(
            r"
            SELECT id, date_time, pvz_id, status
            FROM receptions
            WHERE pvz_id = $1
            ORDER BY date_time DESC, seq DESC
            LIMIT 1
            ",
        )
        .bind(pickup_point_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        row.map(Reception::try_from).transpose()
    }

    async fn insert_reception(&mut self, reception: &Reception) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO receptions (id, date_time, pvz_id, status) VALUES ($1, $2, $3, $4)",
        )
        .bind(reception.id)
        .bind(reception.date_time)
        .bind(reception.pickup_point_id)
        .bind(reception.status.as_str())
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn update_reception_status(
        &mut self,
        id: ReceptionId,
        status: ReceptionStatus,
    ) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE receptions SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(&mut *self.tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::RowNotFound {
                table: "receptions",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn latest_product(
        &mut self,
        reception_id: ReceptionId,
    ) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, date_time, type, reception_id, pvz_id
            FROM products
            WHERE reception_id = $1
            ORDER BY date_time DESC, seq DESC
            LIMIT 1
            ",
        )
        .bind(reception_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        row.map(Product::try_from).transpose()
    }

    async fn insert_product(&mut self, product: &Product) -> Result<(), StoreError> {
        sqlx::query(
            r"
            INSERT INTO products (id, date_time, type, reception_id, pvz_id)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(product.id)
        .bind(product.date_time)
        .bind(product.product_type.as_str())
        .bind(product.reception_id)
        .bind(product.pickup_point_id)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn delete_product(&mut self, id: ProductId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::RowNotFound {
                table: "products",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }
}
