//! Domain records returned by the services.
//!
//! Field names serialize in camelCase (`dateTime`, `pvzId`, `receptionId`)
//! to match the public HTTP API, not the snake_case column names of the
//! database schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{
    City, Email, PickupPointId, ProductId, ProductType, ReceptionId, ReceptionStatus, Role, UserId,
};

/// A registered pickup point. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupPoint {
    pub id: PickupPointId,
    pub registration_date: DateTime<Utc>,
    pub city: City,
}

/// A goods-reception session at a pickup point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reception {
    pub id: ReceptionId,
    pub date_time: DateTime<Utc>,
    #[serde(rename = "pvzId")]
    pub pickup_point_id: PickupPointId,
    pub status: ReceptionStatus,
}

/// A single item recorded within a reception.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub date_time: DateTime<Utc>,
    #[serde(rename = "type")]
    pub product_type: ProductType,
    pub reception_id: ReceptionId,
    #[serde(rename = "pvzId")]
    pub pickup_point_id: PickupPointId,
}

/// A reception together with its products, oldest product first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceptionRecord {
    pub reception: Reception,
    pub products: Vec<Product>,
}

/// A pickup point together with its receptions, newest reception first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickupPointRecord {
    pub pvz: PickupPoint,
    pub receptions: Vec<ReceptionRecord>,
}

/// A service account. The password hash never leaves the store layer
/// except through [`StoredUser`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// A user row including its password hash, for credential checks.
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub user: User,
    pub password_hash: String,
}
