//! Parameters of the reporting query.

use chrono::{DateTime, Utc};

use crate::error::PvzError;

/// Inclusive time window `[start, end]` over reception dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateRange {
    /// Build a range from optional bounds.
    ///
    /// # Errors
    ///
    /// Returns [`PvzError::MissingDateRange`] if either bound is absent and
    /// [`PvzError::InvalidDateRange`] if `start` is after `end`.
    pub fn new(
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Self, PvzError> {
        let (Some(start), Some(end)) = (start, end) else {
            return Err(PvzError::MissingDateRange);
        };
        if start > end {
            return Err(PvzError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }
}

/// One-based page selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u32,
    limit: u32,
}

impl Pagination {
    pub const DEFAULT_PAGE: u32 = 1;
    pub const DEFAULT_LIMIT: u32 = 10;
    pub const MAX_LIMIT: u32 = 30;

    /// # Errors
    ///
    /// Returns [`PvzError::InvalidPagination`] unless `page >= 1` and
    /// `1 <= limit <= MAX_LIMIT`.
    pub fn new(page: u32, limit: u32) -> Result<Self, PvzError> {
        if page == 0 || limit == 0 || limit > Self::MAX_LIMIT {
            return Err(PvzError::InvalidPagination { page, limit });
        }
        Ok(Self { page, limit })
    }

    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of rows to skip: `(page - 1) * limit`.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: Self::DEFAULT_PAGE,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}
