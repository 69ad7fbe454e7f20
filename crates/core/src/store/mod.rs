//! Persistence abstraction for pickup points, receptions, products and users.
//!
//! Services never talk to a database directly. They receive a [`Store`] and run
//! every check-then-act sequence inside a single [`Transaction`]. A transaction
//! that is dropped without [`Transaction::commit`] is rolled back.
//!
//! Every reception and product gets a store-assigned insertion sequence number.
//! "Most recent" means the maximum `(date_time, seq)`, which keeps ordering
//! deterministic when two rows share a timestamp.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{PickupPoint, Product, Reception, StoredUser, User};
use crate::types::{
    DateRange, Email, Pagination, PickupPointId, ProductId, ReceptionId, ReceptionStatus,
};

/// Shared handle to the backing store.
#[async_trait]
pub trait Store: Send + Sync {
    /// Start a transaction.
    async fn begin(&self) -> Result<Box<dyn Transaction>, StoreError>;

    /// All pickup points, oldest registration first.
    async fn list_pickup_points(&self) -> Result<Vec<PickupPoint>, StoreError>;

    /// Pickup points with at least one reception inside `range`, newest
    /// registration first (ties by id), one page of them.
    async fn pickup_points_with_receptions_in(
        &self,
        range: DateRange,
        page: Pagination,
    ) -> Result<Vec<PickupPoint>, StoreError>;

    /// Receptions of a pickup point inside `range`, newest first.
    async fn receptions_in(
        &self,
        pickup_point_id: PickupPointId,
        range: DateRange,
    ) -> Result<Vec<Reception>, StoreError>;

    /// Products of a reception, oldest first.
    async fn products_of(&self, reception_id: ReceptionId) -> Result<Vec<Product>, StoreError>;

    /// Persist a user. A duplicate email yields
    /// [`StoreError::UniqueViolation`] on
    /// [`USER_EMAIL_CONSTRAINT`](crate::error::USER_EMAIL_CONSTRAINT).
    async fn insert_user(&self, user: &User, password_hash: &str) -> Result<(), StoreError>;

    async fn find_user_by_email(&self, email: &Email) -> Result<Option<StoredUser>, StoreError>;

    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// A unit of work against the store.
///
/// Mutations are invisible to other callers until [`commit`](Self::commit).
#[async_trait]
pub trait Transaction: Send {
    async fn insert_pickup_point(&mut self, pickup_point: &PickupPoint) -> Result<(), StoreError>;

    /// Fetch a pickup point and hold it exclusively until the transaction
    /// ends. Concurrent transactions locking the same pickup point wait.
    async fn lock_pickup_point(
        &mut self,
        id: PickupPointId,
    ) -> Result<Option<PickupPoint>, StoreError>;

    /// The most recent reception of a pickup point, whatever its status.
    async fn latest_reception(
        &mut self,
        pickup_point_id: PickupPointId,
    ) -> Result<Option<Reception>, StoreError>;

    /// Insert a reception. A second `in_progress` reception for the same
    /// pickup point yields [`StoreError::UniqueViolation`] on
    /// [`ACTIVE_RECEPTION_CONSTRAINT`](crate::error::ACTIVE_RECEPTION_CONSTRAINT).
    async fn insert_reception(&mut self, reception: &Reception) -> Result<(), StoreError>;

    async fn update_reception_status(
        &mut self,
        id: ReceptionId,
        status: ReceptionStatus,
    ) -> Result<(), StoreError>;

    /// The most recent product of a reception.
    async fn latest_product(
        &mut self,
        reception_id: ReceptionId,
    ) -> Result<Option<Product>, StoreError>;

    async fn insert_product(&mut self, product: &Product) -> Result<(), StoreError>;

    async fn delete_product(&mut self, id: ProductId) -> Result<(), StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}
