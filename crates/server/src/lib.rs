//! PVZ reception service library.
//!
//! Wraps the reception state machine from [`pvz_core`] in an HTTP API with
//! bearer-token authorization, a PostgreSQL [`Store`](pvz_core::Store), an
//! internal export listener and Prometheus metrics.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;
