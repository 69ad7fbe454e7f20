//! Pickup point routes.

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection, rejection::QueryRejection},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use pvz_core::{
    PickupPoint, PickupPointRecord, PickupPointRegistry, Pagination, ReportQuery, Role,
};

use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreatePickupPointRequest {
    pub city: String,
}

/// Raw report parameters. Everything arrives as text so that a malformed or
/// non-positive page or limit falls back to its default instead of rejecting
/// the request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordsQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// POST /pvz
pub async fn create(
    user: AuthUser,
    State(state): State<AppState>,
    body: Result<Json<CreatePickupPointRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PickupPoint>), AppError> {
    user.require(&[Role::Moderator])?;
    let Json(req) = body?;

    let pvz = PickupPointRegistry::new(state.store())
        .create_pickup_point(&req.city)
        .await?;
    crate::metrics::record_pvz_created();

    Ok((StatusCode::CREATED, Json(pvz)))
}

/// GET /pvz?startDate&endDate&page&limit
pub async fn records(
    user: AuthUser,
    State(state): State<AppState>,
    query: Result<Query<RecordsQuery>, QueryRejection>,
) -> Result<Json<Vec<PickupPointRecord>>, AppError> {
    user.require(&[Role::Staff, Role::Moderator])?;
    let Query(query) = query?;

    let start = parse_date("startDate", query.start_date.as_deref())?;
    let end = parse_date("endDate", query.end_date.as_deref())?;
    let page = positive_or(query.page.as_deref(), Pagination::DEFAULT_PAGE);
    let limit = positive_or(query.limit.as_deref(), Pagination::DEFAULT_LIMIT)
        .min(Pagination::MAX_LIMIT);

    let records = ReportQuery::new(state.store())
        .get_pickup_point_records(start, end, page, limit)
        .await?;

    Ok(Json(records))
}

fn parse_date(name: &str, value: Option<&str>) -> Result<Option<DateTime<Utc>>, AppError> {
    value
        .filter(|v| !v.is_empty())
        .map(|v| {
            DateTime::parse_from_rfc3339(v)
                .map(|d| d.with_timezone(&Utc))
                .map_err(|e| AppError::BadRequest(format!("{name}: {e}")))
        })
        .transpose()
}

/// Parse a positive integer, or `default` for anything absent, malformed or
/// below 1.
fn positive_or(value: Option<&str>, default: u32) -> u32 {
    value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|n| *n >= 1)
        .map_or(default, |n| u32::try_from(n).unwrap_or(u32::MAX))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_accepts_offsets() {
        let parsed = parse_date("startDate", Some("2025-04-01T12:00:00+03:00"))
            .unwrap()
            .unwrap();
        assert_eq!(parsed.to_rfc3339(), "2025-04-01T09:00:00+00:00");
    }

    #[test]
    fn test_parse_date_absent_or_empty() {
        assert!(parse_date("startDate", None).unwrap().is_none());
        assert!(parse_date("startDate", Some("")).unwrap().is_none());
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert!(matches!(
            parse_date("endDate", Some("yesterday")),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_positive_or_falls_back() {
        assert_eq!(positive_or(None, 10), 10);
        assert_eq!(positive_or(Some("abc"), 10), 10);
        assert_eq!(positive_or(Some("-1"), 1), 1);
        assert_eq!(positive_or(Some("0"), 1), 1);
        assert_eq!(positive_or(Some("25"), 10), 25);
        assert_eq!(positive_or(Some("99999999999"), 10), u32::MAX);
    }
}
