//! Paging contract for list queries.
//!
//! Pages are 1-based. Size defaults to 10 and clamps to 50.

use serde::{Deserialize, Serialize};

pub const PAGE_SIZE_DEFAULT: u32 = 10;
pub const PAGE_SIZE_MAX: u32 = 50;

/// Normalized paging window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    /// Builds a request, normalizing out-of-range inputs instead of failing.
    pub fn new(page: u32, page_size: Option<u32>) -> Self {
        Self {
            page: page.max(1),
            page_size: normalize_page_size(page_size),
        }
    }

    /// Row offset for SQL `OFFSET`.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }

    pub fn limit(&self) -> u32 {
        self.page_size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, None)
    }
}

/// One page of items plus the unpaged total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub page: u32,
    pub page_size: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_count: u64, request: PageRequest) -> Self {
        Self {
            items,
            total_count,
            page: request.page,
            page_size: request.page_size,
        }
    }
}

/// Normalizes a requested page size according to the list contract.
pub fn normalize_page_size(page_size: Option<u32>) -> u32 {
    match page_size {
        Some(0) | None => PAGE_SIZE_DEFAULT,
        Some(value) if value > PAGE_SIZE_MAX => PAGE_SIZE_MAX,
        Some(value) => value,
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_page_size, PageRequest};

    #[test]
    fn page_size_defaults_and_caps() {
        assert_eq!(normalize_page_size(None), 10);
        assert_eq!(normalize_page_size(Some(0)), 10);
        assert_eq!(normalize_page_size(Some(500)), 50);
        assert_eq!(normalize_page_size(Some(7)), 7);
    }

    #[test]
    fn page_zero_is_treated_as_first_page() {
        let request = PageRequest::new(0, Some(5));
        assert_eq!(request.page, 1);
        assert_eq!(request.offset(), 0);
        assert_eq!(PageRequest::new(3, Some(5)).offset(), 10);
    }
}
