//! Core types for the pickup-point domain.
//!
//! This module provides type-safe wrappers and whitelisted enums.

pub mod catalog;
pub mod email;
pub mod id;
pub mod query;
pub mod status;

pub use catalog::{City, ProductType};
pub use email::{Email, EmailError};
pub use id::*;
pub use query::{DateRange, Pagination};
pub use status::*;
