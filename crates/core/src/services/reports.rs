use chrono::{DateTime, Utc};
use tracing::instrument;

use crate::error::PvzError;
use crate::models::{PickupPointRecord, ReceptionRecord};
use crate::store::Store;
use crate::types::{DateRange, Pagination};

/// Read-only view of pickup points with their receptions and products.
pub struct ReportQuery<'a> {
    store: &'a dyn Store,
}

impl<'a> ReportQuery<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Pickup points with at least one reception in `[start, end]`, newest
    /// registration first. Each carries its receptions inside the range,
    /// newest first, and each reception its products, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `PvzError::MissingDateRange` or `PvzError::InvalidDateRange`
    /// for a bad range, `PvzError::InvalidPagination` for a bad page, or
    /// `PvzError::Store` if any read fails. No partial result is returned.
    #[instrument(skip(self))]
    pub async fn get_pickup_point_records(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        page: u32,
        limit: u32,
    ) -> Result<Vec<PickupPointRecord>, PvzError> {
        let range = DateRange::new(start, end)?;
        let page = Pagination::new(page, limit)?;

        let pickup_points = self
            .store
            .pickup_points_with_receptions_in(range, page)
            .await?;

        let mut records = Vec::with_capacity(pickup_points.len());
        for pvz in pickup_points {
            let receptions = self.store.receptions_in(pvz.id, range).await?;
            let mut reception_records = Vec::with_capacity(receptions.len());
            for reception in receptions {
                let products = self.store.products_of(reception.id).await?;
                reception_records.push(ReceptionRecord {
                    reception,
                    products,
                });
            }
            records.push(PickupPointRecord {
                pvz,
                receptions: reception_records,
            });
        }

        tracing::debug!(count = records.len(), "pickup point records loaded");
        Ok(records)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::Duration;

    use super::*;
    use crate::error::StoreError;
    use crate::models::{PickupPoint, Product, Reception, StoredUser, User};
    use crate::services::testing::{MESSAGE, UnreachableStore};
    use crate::services::{PickupPointRegistry, ProductLedger, ReceptionManager};
    use crate::store::{MemoryStore, Transaction};
    use crate::types::{Email, PickupPointId, ReceptionId, ReceptionStatus};

    /// Serves the outer reads from memory and fails once products are loaded.
    struct BrokenProducts {
        inner: MemoryStore,
        product_reads: AtomicUsize,
    }

    #[async_trait]
    impl Store for BrokenProducts {
        async fn begin(&self) -> Result<Box<dyn Transaction>, StoreError> {
            self.inner.begin().await
        }

        async fn list_pickup_points(&self) -> Result<Vec<PickupPoint>, StoreError> {
            self.inner.list_pickup_points().await
        }

        async fn pickup_points_with_receptions_in(
            &self,
            range: DateRange,
            page: Pagination,
        ) -> Result<Vec<PickupPoint>, StoreError> {
            self.inner.pickup_points_with_receptions_in(range, page).await
        }

        async fn receptions_in(
            &self,
            pickup_point_id: PickupPointId,
            range: DateRange,
        ) -> Result<Vec<Reception>, StoreError> {
            self.inner.receptions_in(pickup_point_id, range).await
        }

        async fn products_of(&self, _reception_id: ReceptionId) -> Result<Vec<Product>, StoreError> {
            self.product_reads.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::backend(std::io::Error::other(MESSAGE)))
        }

        async fn insert_user(&self, user: &User, hash: &str) -> Result<(), StoreError> {
            self.inner.insert_user(user, hash).await
        }

        async fn find_user_by_email(
            &self,
            email: &Email,
        ) -> Result<Option<StoredUser>, StoreError> {
            self.inner.find_user_by_email(email).await
        }

        async fn ping(&self) -> Result<(), StoreError> {
            self.inner.ping().await
        }
    }

    fn window() -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        let now = Utc::now();
        (Some(now - Duration::hours(1)), Some(now + Duration::hours(1)))
    }

    #[tokio::test]
    async fn test_requires_both_dates() {
        let store = MemoryStore::new();
        let query = ReportQuery::new(&store);
        let (start, end) = window();

        let err = query
            .get_pickup_point_records(None, end, 1, 10)
            .await
            .unwrap_err();
        assert!(matches!(err, PvzError::MissingDateRange));
        let err = query
            .get_pickup_point_records(start, None, 1, 10)
            .await
            .unwrap_err();
        assert!(matches!(err, PvzError::MissingDateRange));
    }

    #[tokio::test]
    async fn test_rejects_bad_pagination() {
        let store = MemoryStore::new();
        let (start, end) = window();
        let err = ReportQuery::new(&store)
            .get_pickup_point_records(start, end, 0, 10)
            .await
            .unwrap_err();
        assert!(matches!(err, PvzError::InvalidPagination { page: 0, .. }));
    }

    #[tokio::test]
    async fn test_nested_records_and_ordering() {
        let store = MemoryStore::new();
        let registry = PickupPointRegistry::new(&store);
        let manager = ReceptionManager::new(&store);
        let ledger = ProductLedger::new(&store);

        let busy = registry.create_pickup_point("Moscow").await.unwrap();
        let idle = registry.create_pickup_point("Kazan").await.unwrap();

        let first = manager.open_session(busy.id).await.unwrap();
        let p1 = ledger.add_product(busy.id, "electronics").await.unwrap();
        let p2 = ledger.add_product(busy.id, "clothing").await.unwrap();
        manager.close_session(busy.id).await.unwrap();
        let second = manager.open_session(busy.id).await.unwrap();

        let (start, end) = window();
        let records = ReportQuery::new(&store)
            .get_pickup_point_records(start, end, 1, 10)
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.pvz.id, busy.id);
        assert_ne!(record.pvz.id, idle.id);

        let ids: Vec<_> = record.receptions.iter().map(|r| r.reception.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
        assert_eq!(
            record.receptions[1].reception.status,
            ReceptionStatus::Closed
        );
        assert_eq!(record.receptions[1].products, vec![p1, p2]);
        assert!(record.receptions[0].products.is_empty());
    }

    #[tokio::test]
    async fn test_range_outside_activity_is_empty() {
        let store = MemoryStore::new();
        let pvz = PickupPointRegistry::new(&store)
            .create_pickup_point("Moscow")
            .await
            .unwrap();
        ReceptionManager::new(&store).open_session(pvz.id).await.unwrap();

        let past = Utc::now() - Duration::days(30);
        let records = ReportQuery::new(&store)
            .get_pickup_point_records(Some(past - Duration::days(1)), Some(past), 1, 10)
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_aborts_query() {
        let (start, end) = window();
        let err = ReportQuery::new(&UnreachableStore)
            .get_pickup_point_records(start, end, 1, 10)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), MESSAGE);
    }

    #[tokio::test]
    async fn test_product_read_failure_aborts_query() {
        let inner = MemoryStore::new();
        let pvz = PickupPointRegistry::new(&inner)
            .create_pickup_point("Moscow")
            .await
            .unwrap();
        ReceptionManager::new(&inner).open_session(pvz.id).await.unwrap();
        ProductLedger::new(&inner)
            .add_product(pvz.id, "footwear")
            .await
            .unwrap();

        let store = BrokenProducts {
            inner,
            product_reads: AtomicUsize::new(0),
        };
        let (start, end) = window();
        let err = ReportQuery::new(&store)
            .get_pickup_point_records(start, end, 1, 10)
            .await
            .unwrap_err();

        assert!(matches!(err, PvzError::Store(_)));
        assert_eq!(err.to_string(), MESSAGE);
        assert_eq!(store.product_reads.load(Ordering::SeqCst), 1);
    }
}
