//! `PostgreSQL` implementation of the core [`Store`].
//!
//! ## Tables
//!
//! - `pvz` - Pickup points
//! - `receptions` - Reception sessions, at most one `in_progress` per pickup point
//! - `products` - Products recorded within a reception
//! - `users` - Accounts for password login
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p pvz-cli -- migrate
//! ```

mod rows;
mod transaction;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::instrument;

use pvz_core::{
    DateRange, Email, Pagination, PickupPoint, PickupPointId, Product, Reception, ReceptionId,
    Store, StoreError, StoredUser, Transaction, User,
};

use rows::{PickupPointRow, ProductRow, ReceptionRow, UserRow};
use transaction::PgTransaction;

/// Create a `PostgreSQL` connection pool.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
/// * `max_connections` - Upper bound on pooled connections
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// [`Store`] backed by a `PostgreSQL` pool.
///
/// Each transaction locks the pickup point row it works on with
/// `SELECT ... FOR UPDATE`, and the partial unique index
/// `receptions_one_in_progress_per_pvz` backs the single-active-reception rule.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> Result<Box<dyn Transaction>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgTransaction::new(tx)))
    }

    #[instrument(skip(self))]
    async fn list_pickup_points(&self) -> Result<Vec<PickupPoint>, StoreError> {
        let rows = sqlx::query_as::<_, PickupPointRow>(
            r"
            SELECT id, registration_date, city
            FROM pvz
            ORDER BY registration_date, id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PickupPoint::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn pickup_points_with_receptions_in(
        &self,
        range: DateRange,
        page: Pagination,
    ) -> Result<Vec<PickupPoint>, StoreError> {
        let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);

        let rows = sqlx::query_as::<_, PickupPointRow>(
            r"
            SELECT p.id, p.registration_date, p.city
            FROM pvz p
            WHERE EXISTS (
                SELECT 1 FROM receptions r
                WHERE r.pvz_id = p.id
                  AND r.date_time BETWEEN $1 AND $2
            )
            ORDER BY p.registration_date DESC, p.id
            LIMIT $3 OFFSET $4
            ",
        )
        .bind(range.start())
        .bind(range.end())
        .bind(i64::from(page.limit()))
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PickupPoint::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn receptions_in(
        &self,
        pickup_point_id: PickupPointId,
        range: DateRange,
    ) -> Result<Vec<Reception>, StoreError> {
        let rows = sqlx::query_as::<_, ReceptionRow>(
            r"
            SELECT id, date_time, pvz_id, status
            FROM receptions
            WHERE pvz_id = $1
              AND date_time BETWEEN $2 AND $3
            ORDER BY date_time DESC, seq DESC
            ",
        )
        .bind(pickup_point_id)
        .bind(range.start())
        .bind(range.end())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Reception::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn products_of(&self, reception_id: ReceptionId) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, date_time, type, reception_id, pvz_id
            FROM products
            WHERE reception_id = $1
            ORDER BY date_time, seq
            ",
        )
        .bind(reception_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    #[instrument(skip(self, user, password_hash), fields(user_id = %user.id))]
    async fn insert_user(&self, user: &User, password_hash: &str) -> Result<(), StoreError> {
        sqlx::query(
            r"
            INSERT INTO users (id, email, password_hash, role, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(user.id)
        .bind(user.email.as_str())
        .bind(password_hash)
        .bind(user.role.to_string())
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[instrument(skip(self, email))]
    async fn find_user_by_email(&self, email: &Email) -> Result<Option<StoredUser>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, email, password_hash, role, created_at
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(StoredUser::try_from).transpose()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
