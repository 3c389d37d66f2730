//! Page slicing over the fully filtered rows.

use serde::{Deserialize, Serialize};

/// Requested page. `page` is 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
    pub page: usize,
    pub rows_per_page: usize,
}

impl PageWindow {
    pub fn new(page: usize, rows_per_page: usize) -> Self {
        Self {
            page,
            rows_per_page,
        }
    }

    /// First page with the given size.
    pub fn first(rows_per_page: usize) -> Self {
        Self::new(0, rows_per_page)
    }

    /// Index of the first row on this page.
    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.rows_per_page)
    }
}

impl Default for PageWindow {
    fn default() -> Self {
        Self::first(10)
    }
}

/// One page of rows plus the totals the pagination controls need.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<R> {
    pub items: Vec<R>,
    /// Length of the filtered set before slicing.
    pub total: usize,
    pub page: usize,
    pub rows_per_page: usize,
    pub total_pages: usize,
}

impl<R> Page<R> {
    pub fn has_next(&self) -> bool {
        self.page + 1 < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 0
    }
}

/// Slice `[page * rpp, (page + 1) * rpp)` out of `rows`, clamped to its length.
pub fn paginate<R: Clone>(rows: &[R], window: PageWindow) -> Page<R> {
    let total = rows.len();
    let rows_per_page = window.rows_per_page;
    if rows_per_page == 0 {
        return Page {
            items: Vec::new(),
            total,
            page: window.page,
            rows_per_page,
            total_pages: 0,
        };
    }

    let start = window.offset().min(total);
    let end = start.saturating_add(rows_per_page).min(total);
    Page {
        items: rows[start..end].to_vec(),
        total,
        page: window.page,
        rows_per_page,
        total_pages: total.div_ceil(rows_per_page),
    }
}
