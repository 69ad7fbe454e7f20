//! In-process [`Store`] used by tests and local tooling.

use std::cmp::Reverse;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{Store, Transaction};
use crate::error::{ACTIVE_RECEPTION_CONSTRAINT, StoreError, USER_EMAIL_CONSTRAINT};
use crate::models::{PickupPoint, Product, Reception, StoredUser, User};
use crate::types::{
    DateRange, Email, Pagination, PickupPointId, ProductId, ReceptionId, ReceptionStatus,
};

const PVZ_PKEY: &str = "pvz_pkey";
const RECEPTIONS_PVZ_FKEY: &str = "receptions_pvz_id_fkey";
const PRODUCTS_RECEPTION_FKEY: &str = "products_reception_id_fkey";

#[derive(Debug, Clone)]
struct Sequenced<T> {
    seq: u64,
    row: T,
}

#[derive(Debug, Clone, Default)]
struct State {
    pickup_points: Vec<PickupPoint>,
    receptions: Vec<Sequenced<Reception>>,
    products: Vec<Sequenced<Product>>,
    users: Vec<StoredUser>,
    next_seq: u64,
}

impl State {
    fn next_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    fn has_pickup_point(&self, id: PickupPointId) -> bool {
        self.pickup_points.iter().any(|p| p.id == id)
    }

    fn has_active_reception(&self, pickup_point_id: PickupPointId) -> bool {
        self.receptions.iter().any(|r| {
            r.row.pickup_point_id == pickup_point_id && r.row.status.is_in_progress()
        })
    }

    fn latest_reception(&self, pickup_point_id: PickupPointId) -> Option<Reception> {
        self.receptions
            .iter()
            .filter(|r| r.row.pickup_point_id == pickup_point_id)
            .max_by_key(|r| (r.row.date_time, r.seq))
            .map(|r| r.row.clone())
    }

    fn latest_product(&self, reception_id: ReceptionId) -> Option<Product> {
        self.products
            .iter()
            .filter(|p| p.row.reception_id == reception_id)
            .max_by_key(|p| (p.row.date_time, p.seq))
            .map(|p| p.row.clone())
    }
}

/// A [`Store`] kept entirely in memory.
///
/// A transaction holds the store's lock for its whole lifetime and works on a
/// private copy of the state, which replaces the shared state on commit.
/// Cloning the store yields another handle to the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn Transaction>, StoreError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTransaction { guard, working }))
    }

    async fn list_pickup_points(&self) -> Result<Vec<PickupPoint>, StoreError> {
        let state = self.state.lock().await;
        let mut points = state.pickup_points.clone();
        points.sort_by_key(|p| (p.registration_date, p.id));
        Ok(points)
    }

    async fn pickup_points_with_receptions_in(
        &self,
        range: DateRange,
        page: Pagination,
    ) -> Result<Vec<PickupPoint>, StoreError> {
        let state = self.state.lock().await;
        let mut points: Vec<PickupPoint> = state
            .pickup_points
            .iter()
            .filter(|p| {
                state
                    .receptions
                    .iter()
                    .any(|r| r.row.pickup_point_id == p.id && range.contains(r.row.date_time))
            })
            .cloned()
            .collect();
        points.sort_by_key(|p| (Reverse(p.registration_date), p.id));

        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        Ok(points
            .into_iter()
            .skip(offset)
            .take(page.limit() as usize)
            .collect())
    }

    async fn receptions_in(
        &self,
        pickup_point_id: PickupPointId,
        range: DateRange,
    ) -> Result<Vec<Reception>, StoreError> {
        let state = self.state.lock().await;
        let mut receptions: Vec<&Sequenced<Reception>> = state
            .receptions
            .iter()
            .filter(|r| r.row.pickup_point_id == pickup_point_id && range.contains(r.row.date_time))
            .collect();
        receptions.sort_by_key(|r| Reverse((r.row.date_time, r.seq)));
        Ok(receptions.into_iter().map(|r| r.row.clone()).collect())
    }

    async fn products_of(&self, reception_id: ReceptionId) -> Result<Vec<Product>, StoreError> {
        let state = self.state.lock().await;
        let mut products: Vec<&Sequenced<Product>> = state
            .products
            .iter()
            .filter(|p| p.row.reception_id == reception_id)
            .collect();
        products.sort_by_key(|p| (p.row.date_time, p.seq));
        Ok(products.into_iter().map(|p| p.row.clone()).collect())
    }

    async fn insert_user(&self, user: &User, password_hash: &str) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        if state.users.iter().any(|u| u.user.email == user.email) {
            return Err(StoreError::UniqueViolation {
                constraint: USER_EMAIL_CONSTRAINT.to_string(),
            });
        }
        state.users.push(StoredUser {
            user: user.clone(),
            password_hash: password_hash.to_string(),
        });
        Ok(())
    }

    async fn find_user_by_email(&self, email: &Email) -> Result<Option<StoredUser>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.users.iter().find(|u| &u.user.email == email).cloned())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

struct MemoryTransaction {
    guard: OwnedMutexGuard<State>,
    working: State,
}

#[async_trait]
impl Transaction for MemoryTransaction {
    async fn insert_pickup_point(&mut self, pickup_point: &PickupPoint) -> Result<(), StoreError> {
        if self.working.has_pickup_point(pickup_point.id) {
            return Err(StoreError::UniqueViolation {
                constraint: PVZ_PKEY.to_string(),
            });
        }
        self.working.pickup_points.push(pickup_point.clone());
        Ok(())
    }

    async fn lock_pickup_point(
        &mut self,
        id: PickupPointId,
    ) -> Result<Option<PickupPoint>, StoreError> {
        // The whole store is already held by this transaction.
        Ok(self
            .working
            .pickup_points
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn latest_reception(
        &mut self,
        pickup_point_id: PickupPointId,
    ) -> Result<Option<Reception>, StoreError> {
        Ok(self.working.latest_reception(pickup_point_id))
    }

    async fn insert_reception(&mut self, reception: &Reception) -> Result<(), StoreError> {
        if !self.working.has_pickup_point(reception.pickup_point_id) {
            return Err(StoreError::MissingReference {
                constraint: RECEPTIONS_PVZ_FKEY.to_string(),
            });
        }
        if reception.status.is_in_progress()
            && self.working.has_active_reception(reception.pickup_point_id)
        {
            return Err(StoreError::UniqueViolation {
                constraint: ACTIVE_RECEPTION_CONSTRAINT.to_string(),
            });
        }
        let seq = self.working.next_seq();
        self.working.receptions.push(Sequenced {
            seq,
            row: reception.clone(),
        });
        Ok(())
    }

    async fn update_reception_status(
        &mut self,
        id: ReceptionId,
        status: ReceptionStatus,
    ) -> Result<(), StoreError> {
        let Some(current) = self.working.receptions.iter().find(|r| r.row.id == id) else {
            return Err(StoreError::RowNotFound {
                table: "receptions",
                id: id.to_string(),
            });
        };
        if status.is_in_progress()
            && !current.row.status.is_in_progress()
            && self.working.has_active_reception(current.row.pickup_point_id)
        {
            return Err(StoreError::UniqueViolation {
                constraint: ACTIVE_RECEPTION_CONSTRAINT.to_string(),
            });
        }
        if let Some(reception) = self.working.receptions.iter_mut().find(|r| r.row.id == id) {
            reception.row.status = status;
        }
        Ok(())
    }

    async fn latest_product(
        &mut self,
        reception_id: ReceptionId,
    ) -> Result<Option<Product>, StoreError> {
        Ok(self.working.latest_product(reception_id))
    }

    async fn insert_product(&mut self, product: &Product) -> Result<(), StoreError> {
        if !self
            .working
            .receptions
            .iter()
            .any(|r| r.row.id == product.reception_id)
        {
            return Err(StoreError::MissingReference {
                constraint: PRODUCTS_RECEPTION_FKEY.to_string(),
            });
        }
        let seq = self.working.next_seq();
        self.working.products.push(Sequenced {
            seq,
            row: product.clone(),
        });
        Ok(())
    }

    async fn delete_product(&mut self, id: ProductId) -> Result<(), StoreError> {
        let before = self.working.products.len();
        self.working.products.retain(|p| p.row.id != id);
        if self.working.products.len() == before {
            return Err(StoreError::RowNotFound {
                table: "products",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let Self { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};

    use super::*;
    use crate::types::{City, ProductType};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 1, hour, 0, 0).unwrap()
    }

    fn pickup_point(hour: u32) -> PickupPoint {
        PickupPoint {
            id: PickupPointId::generate(),
            registration_date: at(hour),
            city: City::Kazan,
        }
    }

    fn reception(pvz: &PickupPoint, hour: u32, status: ReceptionStatus) -> Reception {
        Reception {
            id: ReceptionId::generate(),
            date_time: at(hour),
            pickup_point_id: pvz.id,
            status,
        }
    }

    fn product(reception: &Reception, date_time: DateTime<Utc>) -> Product {
        Product {
            id: ProductId::generate(),
            date_time,
            product_type: ProductType::Footwear,
            reception_id: reception.id,
            pickup_point_id: reception.pickup_point_id,
        }
    }

    async fn seed(store: &MemoryStore, pvz: &PickupPoint) {
        let mut tx = store.begin().await.unwrap();
        tx.insert_pickup_point(pvz).await.unwrap();
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_dropped_transaction_rolls_back() {
        let store = MemoryStore::new();
        {
            let mut tx = store.begin().await.unwrap();
            tx.insert_pickup_point(&pickup_point(1)).await.unwrap();
        }
        assert!(store.list_pickup_points().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_second_active_reception_is_rejected() {
        let store = MemoryStore::new();
        let pvz = pickup_point(1);
        seed(&store, &pvz).await;

        let mut tx = store.begin().await.unwrap();
        tx.insert_reception(&reception(&pvz, 2, ReceptionStatus::InProgress))
            .await
            .unwrap();
        let err = tx
            .insert_reception(&reception(&pvz, 3, ReceptionStatus::InProgress))
            .await
            .unwrap_err();
        assert!(err.is_unique_violation_of(ACTIVE_RECEPTION_CONSTRAINT));
    }

    #[tokio::test]
    async fn test_reception_requires_pickup_point() {
        let store = MemoryStore::new();
        let orphan = pickup_point(1);

        let mut tx = store.begin().await.unwrap();
        let err = tx
            .insert_reception(&reception(&orphan, 2, ReceptionStatus::InProgress))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingReference { .. }));
    }

    #[tokio::test]
    async fn test_latest_product_breaks_timestamp_ties_by_insertion() {
        let store = MemoryStore::new();
        let pvz = pickup_point(1);
        seed(&store, &pvz).await;

        let mut tx = store.begin().await.unwrap();
        let open = reception(&pvz, 2, ReceptionStatus::InProgress);
        tx.insert_reception(&open).await.unwrap();
        let first = product(&open, at(3));
        let second = product(&open, at(3));
        tx.insert_product(&first).await.unwrap();
        tx.insert_product(&second).await.unwrap();

        let latest = tx.latest_product(open.id).await.unwrap().unwrap();
        assert_eq!(latest.id, second.id);
        tx.commit().await.unwrap();

        let listed = store.products_of(open.id).await.unwrap();
        assert_eq!(
            listed.iter().map(|p| p.id).collect::<Vec<_>>(),
            vec![first.id, second.id]
        );
    }

    #[tokio::test]
    async fn test_report_query_filters_orders_and_pages() {
        let store = MemoryStore::new();
        let older = pickup_point(1);
        let newer = pickup_point(2);
        let idle = pickup_point(3);
        for pvz in [&older, &newer, &idle] {
            seed(&store, pvz).await;
        }

        let mut tx = store.begin().await.unwrap();
        tx.insert_reception(&reception(&older, 10, ReceptionStatus::Closed))
            .await
            .unwrap();
        tx.insert_reception(&reception(&newer, 11, ReceptionStatus::InProgress))
            .await
            .unwrap();
        tx.insert_reception(&reception(&idle, 20, ReceptionStatus::InProgress))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let range = DateRange::new(Some(at(9)), Some(at(12))).unwrap();
        let all = store
            .pickup_points_with_receptions_in(range, Pagination::default())
            .await
            .unwrap();
        assert_eq!(
            all.iter().map(|p| p.id).collect::<Vec<_>>(),
            vec![newer.id, older.id]
        );

        let second_page = store
            .pickup_points_with_receptions_in(range, Pagination::new(2, 1).unwrap())
            .await
            .unwrap();
        assert_eq!(second_page.len(), 1);
        assert_eq!(second_page[0].id, older.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let store = MemoryStore::new();
        let user = User {
            id: crate::types::UserId::generate(),
            email: Email::parse("staff@example.com").unwrap(),
            role: crate::types::Role::Staff,
            created_at: at(1),
        };
        store.insert_user(&user, "hash").await.unwrap();

        let err = store.insert_user(&user, "hash").await.unwrap_err();
        assert!(err.is_unique_violation_of(USER_EMAIL_CONSTRAINT));
        assert!(
            store
                .find_user_by_email(&user.email)
                .await
                .unwrap()
                .is_some()
        );
    }
}
