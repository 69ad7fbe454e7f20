//! Reception session routes.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection, rejection::PathRejection},
    http::StatusCode,
};
use serde::Deserialize;

use pvz_core::{PickupPointId, Reception, ReceptionManager, Role};

use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenReceptionRequest {
    pub pvz_id: PickupPointId,
}

/// POST /receptions
pub async fn open(
    user: AuthUser,
    State(state): State<AppState>,
    body: Result<Json<OpenReceptionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Reception>), AppError> {
    user.require(&[Role::Staff])?;
    let Json(req) = body?;

    let reception = ReceptionManager::new(state.store())
        .open_session(req.pvz_id)
        .await?;
    crate::metrics::record_reception_created();

    Ok((StatusCode::CREATED, Json(reception)))
}

/// POST /pvz/{pvzId}/close_last_reception
pub async fn close_last(
    user: AuthUser,
    State(state): State<AppState>,
    path: Result<Path<PickupPointId>, PathRejection>,
) -> Result<Json<Reception>, AppError> {
    user.require(&[Role::Staff])?;
    let Path(pvz_id) = path?;

    let reception = ReceptionManager::new(state.store())
        .close_session(pvz_id)
        .await?;

    Ok(Json(reception))
}
