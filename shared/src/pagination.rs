//! Pagination types
//!
//! Every list endpoint accepts `page`/`limit` query parameters and answers
//! with a [`PaginatedResponse`].

use serde::{Deserialize, Serialize};

/// Default page size
pub const DEFAULT_LIMIT: u32 = 10;
/// Largest page size a client may request
pub const MAX_LIMIT: u32 = 50;

/// Page selection (1-based)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageQuery {
    /// Requested page, clamped to >= 1
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Requested page size, clamped to `1..=MAX_LIMIT`
    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    /// Row offset for SQL `OFFSET`
    pub fn offset(&self) -> i64 {
        i64::from(self.page() - 1) * i64::from(self.limit())
    }
}

/// Paginated list response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    /// Items on this page
    pub data: Vec<T>,
    /// Total matching rows
    pub total: u64,
    /// Current page (1-based)
    pub page: u32,
    /// Page size
    pub limit: u32,
    /// Number of pages
    pub total_pages: u32,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, total: u64, page: u32, limit: u32) -> Self {
        let total_pages = if limit > 0 {
            total.div_ceil(u64::from(limit)) as u32
        } else {
            1
        };

        Self {
            data,
            total,
            page,
            limit,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_query_defaults() {
        let query = PageQuery::default();
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), DEFAULT_LIMIT);
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn test_page_query_clamps() {
        let query = PageQuery {
            page: Some(0),
            limit: Some(500),
        };
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), MAX_LIMIT);

        let query = PageQuery {
            page: Some(3),
            limit: Some(20),
        };
        assert_eq!(query.offset(), 40);
    }

    #[test]
    fn test_paginated_response() {
        let items: Vec<i32> = (1..=10).collect();
        let resp = PaginatedResponse::new(items, 101, 2, 10);

        assert_eq!(resp.total, 101);
        assert_eq!(resp.page, 2);
        assert_eq!(resp.total_pages, 11);

        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["totalPages"], 11);
    }
}
