//! Pagination parameters and the paginated result envelope.

use serde::Serialize;

/// Default number of items per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;
/// Upper bound accepted for a page size.
pub const MAX_PAGE_SIZE: usize = 100;

/// Offset/limit pagination parameters. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

impl Pagination {
    pub fn new(page: usize, per_page: usize) -> Self {
        Self { page, per_page }
    }

    /// Number of records skipped before the requested page starts.
    /// Saturates so an absurdly large page lands past the end of the data
    /// instead of overflowing.
    pub fn skip(&self) -> usize {
        (self.page.max(1) - 1).saturating_mul(self.per_page)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of results together with the totals a client needs to render
/// pagination controls. `page` and `limit` echo the request verbatim, even
/// when the requested page lies past the end of the data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, total: usize, page: usize, limit: usize) -> Self {
        Self {
            data,
            total,
            page,
            limit,
            total_pages: total.div_ceil(limit.max(1)),
        }
    }
}
