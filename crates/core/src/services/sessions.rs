use tracing::instrument;

use super::{lock_existing, now};
use crate::error::{ACTIVE_RECEPTION_CONSTRAINT, PvzError};
use crate::models::Reception;
use crate::store::Store;
use crate::types::{PickupPointId, ReceptionId, ReceptionStatus};

/// Opens and closes reception sessions.
///
/// A pickup point has at most one `in_progress` reception at any time. A
/// reception moves from `in_progress` to `closed` once and is never reopened.
pub struct ReceptionManager<'a> {
    store: &'a dyn Store,
}

impl<'a> ReceptionManager<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Open a new reception at a pickup point.
    ///
    /// # Errors
    ///
    /// Returns `PvzError::PickupPointNotFound` if the pickup point does not
    /// exist, `PvzError::SessionAlreadyOpen` if its latest reception is still
    /// in progress, or `PvzError::Store` if the store fails.
    #[instrument(skip(self, pickup_point_id), fields(pvz_id = %pickup_point_id))]
    pub async fn open_session(&self, pickup_point_id: PickupPointId) -> Result<Reception, PvzError> {
        let mut tx = self.store.begin().await?;
        lock_existing(tx.as_mut(), pickup_point_id).await?;

        if let Some(latest) = tx.latest_reception(pickup_point_id).await?
            && latest.status.is_in_progress()
        {
            return Err(PvzError::SessionAlreadyOpen);
        }

        let reception = Reception {
            id: ReceptionId::generate(),
            date_time: now(),
            pickup_point_id,
            status: ReceptionStatus::InProgress,
        };

        tx.insert_reception(&reception).await.map_err(|e| {
            if e.is_unique_violation_of(ACTIVE_RECEPTION_CONSTRAINT) {
                PvzError::SessionAlreadyOpen
            } else {
                PvzError::Store(e)
            }
        })?;
        tx.commit().await?;

        tracing::info!(reception_id = %reception.id, "reception opened");
        Ok(reception)
    }

    /// Close the latest reception of a pickup point.
    ///
    /// # Errors
    ///
    /// Returns `PvzError::PickupPointNotFound` if the pickup point does not
    /// exist, `PvzError::NoSessionToClose` if it has no receptions,
    /// `PvzError::SessionAlreadyClosed` if the latest one is closed, or
    /// `PvzError::Store` if the store fails.
    #[instrument(skip(self, pickup_point_id), fields(pvz_id = %pickup_point_id))]
    pub async fn close_session(
        &self,
        pickup_point_id: PickupPointId,
    ) -> Result<Reception, PvzError> {
        let mut tx = self.store.begin().await?;
        lock_existing(tx.as_mut(), pickup_point_id).await?;

        let mut reception = tx
            .latest_reception(pickup_point_id)
            .await?
            .ok_or(PvzError::NoSessionToClose)?;
        if !reception.status.is_in_progress() {
            return Err(PvzError::SessionAlreadyClosed);
        }

        tx.update_reception_status(reception.id, ReceptionStatus::Closed)
            .await?;
        tx.commit().await?;

        reception.status = ReceptionStatus::Closed;
        tracing::info!(reception_id = %reception.id, "reception closed");
        Ok(reception)
    }
}
