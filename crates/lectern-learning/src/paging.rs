//! Page-number pagination on top of the repositories' offset/limit.

use lectern_core::repository::{PaginatedResult, Pagination};
use serde::{Deserialize, Serialize};

use crate::config::LearningConfig;

/// A caller's page request. Missing values fall back to page 1 and the
/// configured default size.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl PageRequest {
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }

    /// Normalise to `(page, limit)`: page is at least 1, limit lies in
    /// `1..=max_page_size`.
    pub fn resolve(&self, config: &LearningConfig) -> (u64, u64) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self
            .limit
            .unwrap_or(config.default_page_size)
            .clamp(1, config.max_page_size.max(1));
        (page, limit)
    }

    pub(crate) fn to_pagination(self, config: &LearningConfig) -> (u64, u64, Pagination) {
        let (page, limit) = self.resolve(config);
        let pagination = Pagination {
            offset: (page - 1).saturating_mul(limit),
            limit,
        };
        (page, limit, pagination)
    }
}

/// One page of results with the numbers a client needs to page further.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub pages: u64,
}

impl<T> Page<T> {
    pub(crate) fn from_result(result: PaginatedResult<T>, page: u64, limit: u64) -> Self {
        Self {
            pages: result.total.div_ceil(limit),
            items: result.items,
            page,
            limit,
            total: result.total,
        }
    }
}
