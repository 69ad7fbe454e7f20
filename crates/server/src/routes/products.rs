//! Product routes.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection, rejection::PathRejection},
    http::StatusCode,
};
use serde::Deserialize;

use pvz_core::{PickupPointId, Product, ProductLedger, Role};

use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddProductRequest {
    #[serde(rename = "type")]
    pub product_type: String,
    pub pvz_id: PickupPointId,
}

/// POST /products
pub async fn add(
    user: AuthUser,
    State(state): State<AppState>,
    body: Result<Json<AddProductRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    user.require(&[Role::Staff])?;
    let Json(req) = body?;

    let product = ProductLedger::new(state.store())
        .add_product(req.pvz_id, &req.product_type)
        .await?;
    crate::metrics::record_product_created();

    Ok((StatusCode::CREATED, Json(product)))
}

/// POST /pvz/{pvzId}/delete_last_product
pub async fn delete_last(
    user: AuthUser,
    State(state): State<AppState>,
    path: Result<Path<PickupPointId>, PathRejection>,
) -> Result<StatusCode, AppError> {
    user.require(&[Role::Staff])?;
    let Path(pvz_id) = path?;

    ProductLedger::new(state.store())
        .delete_last_product(pvz_id)
        .await?;

    Ok(StatusCode::OK)
}
