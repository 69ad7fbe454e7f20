//! Error types for the reception workflow.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::types::PickupPointId;

/// Name of the uniqueness constraint that allows at most one `in_progress`
/// reception per pickup point. Stores report violations of it through
/// [`StoreError::UniqueViolation`].
pub const ACTIVE_RECEPTION_CONSTRAINT: &str = "receptions_one_in_progress_per_pvz";

/// Name of the uniqueness constraint on user emails.
pub const USER_EMAIL_CONSTRAINT: &str = "users_email_key";

/// Errors raised by a [`Store`](crate::store::Store) implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend failed (connection, query, I/O). The message is preserved.
    #[error(transparent)]
    Backend(Box<dyn std::error::Error + Send + Sync>),

    /// A uniqueness constraint rejected the write.
    #[error("unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    /// A referenced row does not exist.
    #[error("foreign key violated: {constraint}")]
    MissingReference { constraint: String },

    /// An update or delete targeted a row that does not exist.
    #[error("{table} row {id} not found")]
    RowNotFound { table: &'static str, id: String },

    /// A stored row could not be mapped back to a domain value.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

impl StoreError {
    /// Wrap any backend error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Box::new(err))
    }

    #[must_use]
    pub fn is_unique_violation_of(&self, name: &str) -> bool {
        matches!(self, Self::UniqueViolation { constraint } if constraint == name)
    }
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = e {
            let constraint = db_err.constraint().unwrap_or_default().to_string();
            if db_err.is_unique_violation() {
                return Self::UniqueViolation { constraint };
            }
            if db_err.is_foreign_key_violation() {
                return Self::MissingReference { constraint };
            }
        }
        Self::backend(e)
    }
}

/// Broad category of a [`PvzError`], used by transports to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or missing input; the store was not touched.
    Validation,
    /// A business rule rejected the transition.
    InvariantViolation,
    /// A referenced entity does not exist.
    NotFound,
    /// The store failed; not client-correctable.
    StoreFailure,
}

/// Errors returned by the pickup-point services.
#[derive(Debug, Error)]
pub enum PvzError {
    #[error("pickup points can only be opened in Москва, Санкт-Петербург or Казань (got {0:?})")]
    InvalidCity(String),

    #[error("invalid product type: {0:?}")]
    InvalidProductType(String),

    #[error("startDate and endDate are required")]
    MissingDateRange,

    #[error("startDate {start} is after endDate {end}")]
    InvalidDateRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("invalid pagination: page={page}, limit={limit}")]
    InvalidPagination { page: u32, limit: u32 },

    #[error("cannot open a new reception while the previous one is not closed")]
    SessionAlreadyOpen,

    #[error("reception is already closed")]
    SessionAlreadyClosed,

    #[error("no active reception")]
    NoActiveSession,

    #[error("no reception to close")]
    NoSessionToClose,

    #[error("no products to delete")]
    NoProductsToDelete,

    #[error("pickup point {0} not found")]
    PickupPointNotFound(PickupPointId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PvzError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidCity(_)
            | Self::InvalidProductType(_)
            | Self::MissingDateRange
            | Self::InvalidDateRange { .. }
            | Self::InvalidPagination { .. } => ErrorKind::Validation,
            Self::SessionAlreadyOpen
            | Self::SessionAlreadyClosed
            | Self::NoActiveSession
            | Self::NoSessionToClose
            | Self::NoProductsToDelete => ErrorKind::InvariantViolation,
            Self::PickupPointNotFound(_) => ErrorKind::NotFound,
            Self::Store(_) => ErrorKind::StoreFailure,
        }
    }
}
