//! Row types and their mapping to domain records.
//!
//! Enumerated columns are stored as `TEXT` and parsed here; a value outside the
//! whitelist is reported as [`StoreError::DataCorruption`].

use chrono::{DateTime, Utc};

use pvz_core::{
    Email, PickupPoint, PickupPointId, Product, ProductId, Reception, ReceptionId, StoreError,
    StoredUser, User, UserId,
};

#[derive(Debug, sqlx::FromRow)]
pub(super) struct PickupPointRow {
    id: PickupPointId,
    registration_date: DateTime<Utc>,
    city: String,
}

impl TryFrom<PickupPointRow> for PickupPoint {
    type Error = StoreError;

    fn try_from(row: PickupPointRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            registration_date: row.registration_date,
            city: row
                .city
                .parse()
                .map_err(|e| StoreError::DataCorruption(format!("pvz {}: {e}", row.id)))?,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct ReceptionRow {
    id: ReceptionId,
    date_time: DateTime<Utc>,
    pvz_id: PickupPointId,
    status: String,
}

impl TryFrom<ReceptionRow> for Reception {
    type Error = StoreError;

    fn try_from(row: ReceptionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            date_time: row.date_time,
            pickup_point_id: row.pvz_id,
            status: row
                .status
                .parse()
                .map_err(|e| StoreError::DataCorruption(format!("reception {}: {e}", row.id)))?,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct ProductRow {
    id: ProductId,
    date_time: DateTime<Utc>,
    #[sqlx(rename = "type")]
    product_type: String,
    reception_id: ReceptionId,
    pvz_id: PickupPointId,
}

impl TryFrom<ProductRow> for Product {
    type Error = StoreError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            date_time: row.date_time,
            product_type: row
                .product_type
                .parse()
                .map_err(|e| StoreError::DataCorruption(format!("product {}: {e}", row.id)))?,
            reception_id: row.reception_id,
            pickup_point_id: row.pvz_id,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(super) struct UserRow {
    id: UserId,
    email: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for StoredUser {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            StoreError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let role = row
            .role
            .parse()
            .map_err(|e| StoreError::DataCorruption(format!("user {}: {e}", row.id)))?;

        Ok(Self {
            user: User {
                id: row.id,
                email,
                role,
                created_at: row.created_at,
            },
            password_hash: row.password_hash,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pvz_core::{City, ProductType, ReceptionStatus};

    use super::*;

    #[test]
    fn test_pickup_point_row_maps_city() {
        let row = PickupPointRow {
            id: PickupPointId::generate(),
            registration_date: Utc::now(),
            city: "Санкт-Петербург".to_string(),
        };
        assert_eq!(PickupPoint::try_from(row).unwrap().city, City::SaintPetersburg);
    }

    #[test]
    fn test_unknown_city_is_corruption() {
        let row = PickupPointRow {
            id: PickupPointId::generate(),
            registration_date: Utc::now(),
            city: "Атлантида".to_string(),
        };
        assert!(matches!(
            PickupPoint::try_from(row),
            Err(StoreError::DataCorruption(_))
        ));
    }

    #[test]
    fn test_reception_and_product_rows() {
        let reception = Reception::try_from(ReceptionRow {
            id: ReceptionId::generate(),
            date_time: Utc::now(),
            pvz_id: PickupPointId::generate(),
            status: "closed".to_string(),
        })
        .unwrap();
        assert_eq!(reception.status, ReceptionStatus::Closed);

        let product = Product::try_from(ProductRow {
            id: ProductId::generate(),
            date_time: Utc::now(),
            product_type: "электроника".to_string(),
            reception_id: reception.id,
            pvz_id: reception.pickup_point_id,
        })
        .unwrap();
        assert_eq!(product.product_type, ProductType::Electronics);
    }
}
