use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::form::FormStatus;
use crate::limits::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Records list query. `created_by` is forced to the caller for non-admins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct FormFilter {
    pub status: Option<FormStatus>,
    pub search: Option<String>,
    pub date_from: Option<jiff::civil::Date>,
    pub date_to: Option<jiff::civil::Date>,
    pub created_by: Option<i64>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl FormFilter {
    /// 1-based page number, never zero.
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page() - 1) * u64::from(self.per_page())
    }

    /// The trimmed search term, or `None` when blank.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, page: u32, per_page: u32) -> Self {
        let total_pages =
            u32::try_from(total.div_ceil(u64::from(per_page.max(1)))).unwrap_or(u32::MAX);
        Self {
            items,
            total,
            page,
            per_page,
            total_pages,
        }
    }
}
