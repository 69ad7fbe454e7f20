use tracing::instrument;

use super::now;
use crate::error::PvzError;
use crate::models::PickupPoint;
use crate::store::Store;
use crate::types::{City, PickupPointId};

/// Creates and lists pickup points.
pub struct PickupPointRegistry<'a> {
    store: &'a dyn Store,
}

impl<'a> PickupPointRegistry<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Register a pickup point in one of the allowed cities.
    ///
    /// # Errors
    ///
    /// Returns `PvzError::InvalidCity` if `city` is not whitelisted, or
    /// `PvzError::Store` if persisting fails.
    #[instrument(skip(self))]
    pub async fn create_pickup_point(&self, city: &str) -> Result<PickupPoint, PvzError> {
        let city: City = city
            .parse()
            .map_err(|_| PvzError::InvalidCity(city.to_string()))?;

        let pickup_point = PickupPoint {
            id: PickupPointId::generate(),
            registration_date: now(),
            city,
        };

        let mut tx = self.store.begin().await?;
        tx.insert_pickup_point(&pickup_point).await?;
        tx.commit().await?;

        tracing::info!(pvz_id = %pickup_point.id, city = %pickup_point.city, "pickup point created");
        Ok(pickup_point)
    }

    /// Every pickup point, oldest registration first.
    ///
    /// # Errors
    ///
    /// Returns `PvzError::Store` if the read fails.
    #[instrument(skip(self))]
    pub async fn list_all_pickup_points(&self) -> Result<Vec<PickupPoint>, PvzError> {
        Ok(self.store.list_pickup_points().await?)
    }
}
