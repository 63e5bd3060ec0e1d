//! Shared pagination types for list endpoints.

use serde::{Deserialize, Serialize};

/// Upper bound applied to `limit`.
pub const MAX_LIMIT: i64 = 200;

pub fn default_limit() -> i64 {
    50
}

/// `?limit=&offset=` query parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self { limit: default_limit(), offset: 0 }
    }
}

impl PaginationQuery {
    /// Clamp to `[1, max_limit]` and a non-negative offset.
    pub fn clamp(&self, max_limit: i64) -> (i64, i64) {
        (self.limit.clamp(1, max_limit), self.offset.max(0))
    }
}

/// Paginated list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, total: i64, limit: i64, offset: i64) -> Self {
        Self { items, total, limit, offset }
    }
}
