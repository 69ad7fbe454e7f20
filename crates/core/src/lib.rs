//! PVZ Core - pickup-point reception domain.
//!
//! This crate holds the reception workflow used by every PVZ component:
//! - `server` - HTTP API and export listener
//! - `cli` - Command-line tools for migrations and user management
//!
//! # Architecture
//!
//! The core crate does no network I/O of its own. Persistence goes through the
//! [`Store`] trait; the server provides a `PostgreSQL` implementation and this
//! crate ships [`MemoryStore`] for tests.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, whitelisted cities and product types, statuses
//! - [`models`] - Pickup points, receptions, products and users
//! - [`store`] - Repository and transaction traits
//! - [`services`] - Registry, reception state machine, product ledger, reports
//! - [`error`] - Domain and store errors

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod error;
pub mod models;
pub mod services;
pub mod store;
pub mod types;

pub use error::{ErrorKind, PvzError, StoreError};
pub use models::*;
pub use services::{PickupPointRegistry, ProductLedger, ReceptionManager, ReportQuery};
pub use store::{MemoryStore, Store, Transaction};
pub use types::*;
