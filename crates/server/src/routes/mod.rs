//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                              - Liveness
//! GET  /health/ready                        - Readiness (store ping)
//!
//! # Auth
//! POST /dummyLogin                          - Token for a role
//! POST /register                            - Create account
//! POST /login                               - Token for an account
//!
//! # Pickup points
//! POST /pvz                                 - Register pickup point (moderator)
//! GET  /pvz                                 - Reception report (staff, moderator)
//!
//! # Receptions (staff)
//! POST /receptions                          - Open reception
//! POST /pvz/{pvzId}/close_last_reception    - Close open reception
//!
//! # Products (staff)
//! POST /products                            - Add product to open reception
//! POST /pvz/{pvzId}/delete_last_product     - Remove newest product
//! ```
//!
//! The export listener serves `GET /v1/pickup-points` on its own port.

pub mod auth;
pub mod export;
pub mod health;
pub mod products;
pub mod pvz;
pub mod receptions;

use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, Response},
    middleware::from_fn,
    routing::{get, post},
};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::{request_id_middleware, track_metrics};
use crate::state::AppState;

/// Build the public API router with its middleware stack.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(api_routes())
        .route_layer(from_fn(track_metrics))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(make_span)
                .on_response(on_response),
        )
        .with_state(state)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Build the export router.
pub fn export_app(state: AppState) -> Router {
    Router::new()
        .route("/v1/pickup-points", get(export::pickup_points))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(make_span)
                .on_response(on_response),
        )
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/dummyLogin", post(auth::dummy_login))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/pvz", post(pvz::create).get(pvz::records))
        .route("/pvz/{pvz_id}/close_last_reception", post(receptions::close_last))
        .route("/pvz/{pvz_id}/delete_last_product", post(products::delete_last))
        .route("/receptions", post(receptions::open))
        .route("/products", post(products::add))
}

fn make_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = tracing::field::Empty,
        status = tracing::field::Empty,
        latency_ms = tracing::field::Empty,
    )
}

#[allow(clippy::cast_possible_truncation)]
fn on_response(response: &Response<Body>, latency: Duration, span: &Span) {
    span.record("status", response.status().as_u16());
    span.record("latency_ms", latency.as_millis() as u64);
    DefaultOnResponse::default().on_response(response, latency, span);
}
