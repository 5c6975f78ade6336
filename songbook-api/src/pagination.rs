//! Pagination utilities for song listings
//!
//! Unlike a clamped browser, out-of-range pages are not pulled back onto the
//! last page: they simply yield an empty slice.

/// Default page number when the client omits `page`
pub const DEFAULT_PAGE: i64 = 1;
/// Default page size when the client omits `limit`
pub const DEFAULT_LIMIT: i64 = 10;

/// Pagination metadata calculated from total results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: i64,
    /// Page size
    pub limit: i64,
    /// Total number of pages
    pub total_pages: i64,
    /// Offset for SQL LIMIT/OFFSET query
    pub offset: i64,
}

/// Calculate pagination metadata from total results and requested page
///
/// Callers validate `page >= 1` and `limit >= 1` first.
///
/// # Examples
/// ```
/// use songbook_api::pagination::calculate_pagination;
///
/// // 25 matches at 10 per page = 3 pages (10 + 10 + 5)
/// let p = calculate_pagination(25, 2, 10);
/// assert_eq!(p.total_pages, 3);
/// assert_eq!(p.offset, 10);
/// ```
pub fn calculate_pagination(total_results: i64, page: i64, limit: i64) -> Pagination {
    let total_pages = if total_results <= 0 {
        0
    } else {
        (total_results - 1) / limit + 1
    };
    let offset = (page - 1).saturating_mul(limit);

    Pagination {
        page,
        limit,
        total_pages,
        offset,
    }
}
