//! Pagination types shared by all list endpoints.
//!
//! Every paginated endpoint follows the same pattern:
//! `offset = (page - 1) * page_size`, `total_pages = ceil(count / page_size)`,
//! with page 1 / page size 10 as the defaults when the query parameters are
//! absent or not numeric.

use serde::Serialize;

/// Default page number when none is supplied.
pub const DEFAULT_PAGE: i64 = 1;
/// Default page size when none is supplied.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Sanitized pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    page: i64,
    page_size: i64,
}

impl PageParams {
    /// Build parameters from raw query-string values.
    ///
    /// Values that are absent, not parseable as integers, or less than 1 fall
    /// back to the defaults.
    #[must_use]
    pub fn from_query(page: Option<&str>, page_size: Option<&str>) -> Self {
        Self {
            page: parse_or(page, DEFAULT_PAGE),
            page_size: parse_or(page_size, DEFAULT_PAGE_SIZE),
        }
    }

    /// Build parameters from already-numeric values, sanitizing non-positives.
    #[must_use]
    pub fn new(page: i64, page_size: i64) -> Self {
        Self {
            page: if page >= 1 { page } else { DEFAULT_PAGE },
            page_size: if page_size >= 1 {
                page_size
            } else {
                DEFAULT_PAGE_SIZE
            },
        }
    }

    /// The 1-based page number.
    #[must_use]
    pub const fn page(&self) -> i64 {
        self.page
    }

    /// Number of rows per page.
    #[must_use]
    pub const fn page_size(&self) -> i64 {
        self.page_size
    }

    /// Number of rows to skip: `(page - 1) * page_size`.
    #[must_use]
    pub const fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }

    /// Total page count for `total` rows: `ceil(total / page_size)`.
    #[must_use]
    pub const fn total_pages(&self, total: i64) -> i64 {
        (total + self.page_size - 1) / self.page_size
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

fn parse_or(value: Option<&str>, default: i64) -> i64 {
    match value.and_then(|v| v.trim().parse::<i64>().ok()) {
        Some(n) if n >= 1 => n,
        _ => default,
    }
}

/// One page of results plus the total page count.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    /// Rows for this page. Never longer than the requested page size.
    pub data: Vec<T>,
    /// Total number of pages for the full result set.
    pub total_pages: i64,
}

impl<T> Page<T> {
    /// Assemble a page from fetched rows and the total row count.
    #[must_use]
    pub fn new(data: Vec<T>, params: PageParams, total: i64) -> Self {
        Self {
            data,
            total_pages: params.total_pages(total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_absent() {
        let params = PageParams::from_query(None, None);
        assert_eq!(params.page(), 1);
        assert_eq!(params.page_size(), 10);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_defaults_when_non_numeric() {
        let params = PageParams::from_query(Some("abc"), Some("1.5"));
        assert_eq!(params.page(), 1);
        assert_eq!(params.page_size(), 10);
    }

    #[test]
    fn test_defaults_when_non_positive() {
        let params = PageParams::from_query(Some("0"), Some("-3"));
        assert_eq!(params.page(), 1);
        assert_eq!(params.page_size(), 10);
    }

    #[test]
    fn test_offset() {
        let params = PageParams::from_query(Some("3"), Some("20"));
        assert_eq!(params.offset(), 40);
    }

    #[test]
    fn test_total_pages_ceiling() {
        let params = PageParams::new(1, 10);
        assert_eq!(params.total_pages(0), 0);
        assert_eq!(params.total_pages(1), 1);
        assert_eq!(params.total_pages(10), 1);
        assert_eq!(params.total_pages(11), 2);
        assert_eq!(params.total_pages(100), 10);
    }

    #[test]
    fn test_total_pages_matches_ceil_for_many_sizes() {
        for page_size in 1..=25_i64 {
            let params = PageParams::new(1, page_size);
            for total in 0..=200_i64 {
                let expected = (total as f64 / page_size as f64).ceil() as i64;
                assert_eq!(params.total_pages(total), expected);
            }
        }
    }

    #[test]
    fn test_page_assembly() {
        let params = PageParams::new(2, 5);
        let page = Page::new(vec![1, 2, 3, 4, 5], params, 12);
        assert_eq!(page.data.len(), 5);
        assert_eq!(page.total_pages, 3);
    }
}
