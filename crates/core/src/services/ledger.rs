use tracing::instrument;

use super::{lock_existing, now};
use crate::error::PvzError;
use crate::models::Product;
use crate::store::Store;
use crate::types::{PickupPointId, ProductId, ProductType};

/// Appends products to the active reception and removes them newest first.
pub struct ProductLedger<'a> {
    store: &'a dyn Store,
}

impl<'a> ProductLedger<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Record a product in the active reception of a pickup point.
    ///
    /// # Errors
    ///
    /// Returns `PvzError::InvalidProductType` if `product_type` is not
    /// whitelisted (checked before the store is touched),
    /// `PvzError::PickupPointNotFound` if the pickup point does not exist,
    /// `PvzError::NoActiveSession` if there is no reception in progress, or
    /// `PvzError::Store` if the store fails.
    #[instrument(skip(self, pickup_point_id), fields(pvz_id = %pickup_point_id))]
    pub async fn add_product(
        &self,
        pickup_point_id: PickupPointId,
        product_type: &str,
    ) -> Result<Product, PvzError> {
        let product_type: ProductType = product_type
            .parse()
            .map_err(|_| PvzError::InvalidProductType(product_type.to_string()))?;

        let mut tx = self.store.begin().await?;
        lock_existing(tx.as_mut(), pickup_point_id).await?;

        let reception = tx
            .latest_reception(pickup_point_id)
            .await?
            .filter(|r| r.status.is_in_progress())
            .ok_or(PvzError::NoActiveSession)?;

        let product = Product {
            id: ProductId::generate(),
            date_time: now(),
            product_type,
            reception_id: reception.id,
            pickup_point_id,
        };
        tx.insert_product(&product).await?;
        tx.commit().await?;

        tracing::info!(
            product_id = %product.id,
            reception_id = %reception.id,
            product_type = %product.product_type,
            "product added"
        );
        Ok(product)
    }

    /// Remove the most recently added product of the active reception.
    ///
    /// # Errors
    ///
    /// Returns `PvzError::PickupPointNotFound` if the pickup point does not
    /// exist, `PvzError::NoActiveSession` if it has no receptions,
    /// `PvzError::SessionAlreadyClosed` if the latest reception is closed,
    /// `PvzError::NoProductsToDelete` if the reception is empty, or
    /// `PvzError::Store` if the store fails.
    #[instrument(skip(self, pickup_point_id), fields(pvz_id = %pickup_point_id))]
    pub async fn delete_last_product(&self, pickup_point_id: PickupPointId) -> Result<(), PvzError> {
        let mut tx = self.store.begin().await?;
        lock_existing(tx.as_mut(), pickup_point_id).await?;

        let reception = tx
            .latest_reception(pickup_point_id)
            .await?
            .ok_or(PvzError::NoActiveSession)?;
        if !reception.status.is_in_progress() {
            return Err(PvzError::SessionAlreadyClosed);
        }

        let product = tx
            .latest_product(reception.id)
            .await?
            .ok_or(PvzError::NoProductsToDelete)?;
        tx.delete_product(product.id).await?;
        tx.commit().await?;

        tracing::info!(product_id = %product.id, reception_id = %reception.id, "product deleted");
        Ok(())
    }
}
