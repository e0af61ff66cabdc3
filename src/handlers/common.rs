use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

use crate::PaginatedResponse;

/// Pagination parameters for list operations
#[derive(Debug, Deserialize, Serialize, IntoParams)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

fn default_page() -> u64 {
    1
}

fn default_per_page() -> u64 {
    20
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl PaginationParams {
    pub fn limit(&self) -> u64 {
        self.per_page.clamp(1, crate::services::MAX_LIMIT)
    }

    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1) * self.limit()
    }

    /// Wrap a page of items into the standard paginated envelope.
    pub fn paginate<T>(&self, items: Vec<T>, total: u64) -> PaginatedResponse<T> {
        let limit = self.limit();
        PaginatedResponse {
            items,
            total,
            page: self.page.max(1),
            limit,
            total_pages: total.div_ceil(limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_derives_from_page() {
        let params = PaginationParams {
            page: 3,
            per_page: 20,
        };
        assert_eq!(params.offset(), 40);
    }

    #[test]
    fn per_page_clamped() {
        let params = PaginationParams {
            page: 1,
            per_page: 100_000,
        };
        assert_eq!(params.limit(), crate::services::MAX_LIMIT);
    }

    #[test]
    fn total_pages_rounds_up() {
        let params = PaginationParams {
            page: 1,
            per_page: 20,
        };
        let wrapped = params.paginate(vec![1, 2, 3], 41);
        assert_eq!(wrapped.total_pages, 3);
    }
}
