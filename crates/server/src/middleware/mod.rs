//! HTTP middleware for the PVZ API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transaction per route)
//! 2. `TraceLayer` (request span)
//! 3. Request ID
//! 4. Request metrics (per matched route)
//!
//! Authentication is an extractor ([`AuthUser`]) rather than a layer so that
//! each handler states the roles it accepts.

pub mod auth;
pub mod metrics;
pub mod request_id;

pub use auth::AuthUser;
pub use metrics::track_metrics;
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
