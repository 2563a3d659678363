//! Filter state and pagination rules for the inbox.

use serde::{Deserialize, Serialize};

use super::message::StatusFilter;

/// The tuple (status, search, page, limit) that fully determines which page
/// of messages is fetched.
///
/// The builder methods enforce the reset rule: narrowing by status or search
/// always returns to page 1.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilterState {
    /// Status dropdown value.
    pub status: StatusFilter,
    /// Free-text search.
    pub search: String,
    /// 1-based page number.
    pub page: u32,
    /// Page size.
    pub limit: u32,
}

impl FilterState {
    /// Unfiltered first page with `limit` rows per page (at least 1).
    pub fn new(limit: u32) -> Self {
        Self {
            status: StatusFilter::All,
            search: String::new(),
            page: 1,
            limit: limit.max(1),
        }
    }

    /// Same filter with a different status, back on page 1.
    #[must_use]
    pub fn with_status(mut self, status: StatusFilter) -> Self {
        self.status = status;
        self.page = 1;
        self
    }

    /// Same filter with a different search text, back on page 1.
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self.page = 1;
        self
    }

    /// Same filter on `page`, clamped to `[1, pagination.page_count()]`.
    #[must_use]
    pub fn with_page(mut self, page: u32, pagination: &Pagination) -> Self {
        self.page = pagination.clamp(page);
        self
    }
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new(10)
    }
}

/// Pagination metadata returned with each page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Number of pages for the current filter.
    #[serde(default)]
    pub pages: u32,
    /// Number of matching messages.
    #[serde(default)]
    pub total: u64,
}

impl Pagination {
    /// Page count, never below 1.
    pub fn page_count(&self) -> u32 {
        self.pages.max(1)
    }

    /// Clamp `page` into `[1, page_count()]`.
    pub fn clamp(&self, page: u32) -> u32 {
        page.clamp(1, self.page_count())
    }

    /// Pager controls for `page`.
    pub fn bar(&self, page: u32) -> PaginationBar {
        let pages = self.page_count();
        PaginationBar {
            page,
            pages,
            visible: self.pages > 1,
            previous_enabled: page > 1,
            next_enabled: page < pages,
        }
    }
}

/// Rendered state of the Previous / Next controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationBar {
    /// Current page.
    pub page: u32,
    /// Page count (at least 1).
    pub pages: u32,
    /// The bar is only drawn for multi-page results.
    pub visible: bool,
    /// "Previous" is clickable.
    pub previous_enabled: bool,
    /// "Next" is clickable.
    pub next_enabled: bool,
}

impl PaginationBar {
    /// `Page x of y`.
    pub fn label(&self) -> String {
        format!("Page {} of {}", self.page, self.pages)
    }
}
