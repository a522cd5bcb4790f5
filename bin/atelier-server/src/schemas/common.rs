//! Shared pagination response type.

use serde::Serialize;
use utoipa::ToSchema;

use crate::db::Page;

/// One page of a collection, plus the total row count for the filter.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PageResponse<T> {
    pub records: Vec<T>,
    pub current: u32,
    pub size: u32,
    pub total: u64,
}

impl<T> PageResponse<T> {
    pub fn new(records: Vec<T>, page: Page, total: u64) -> Self {
        Self {
            records,
            current: page.current,
            size: page.size,
            total,
        }
    }
}
