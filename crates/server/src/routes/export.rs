//! Read-only export listener.
//!
//! Serves the full pickup point list to internal consumers. It has no
//! authentication and must only be bound on a private interface.

use axum::{Json, extract::State};

use pvz_core::{PickupPoint, PickupPointRegistry};

use crate::error::AppError;
use crate::state::AppState;

/// GET /v1/pickup-points
pub async fn pickup_points(
    State(state): State<AppState>,
) -> Result<Json<Vec<PickupPoint>>, AppError> {
    let pickup_points = PickupPointRegistry::new(state.store())
        .list_all_pickup_points()
        .await?;
    Ok(Json(pickup_points))
}
