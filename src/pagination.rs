//! Page-number window for a pager control.

use serde::Serialize;

use crate::services::search::SearchState;

/// Page numbers to show around `current_page`; `None` marks a gap.
fn get_pages(
    total_pages: usize,
    current_page: usize,
    left_edge: usize,
    left_current: usize,
    right_current: usize,
    right_edge: usize,
) -> Vec<Option<usize>> {
    let last_page = total_pages;

    if last_page == 0 {
        return vec![];
    }

    let mut pages = Vec::new();

    let left_end = (1 + left_edge).min(last_page + 1);
    pages.extend((1..left_end).map(Some));

    let mid_start = left_end.max(current_page.saturating_sub(left_current));
    let mid_end = (current_page + right_current + 1).min(last_page + 1);

    if mid_start > left_end {
        pages.push(None);
    }
    pages.extend((mid_start..mid_end).map(Some));

    let right_start = mid_end.max(last_page.saturating_sub(right_edge) + 1);

    if right_start > mid_end {
        pages.push(None);
    }
    pages.extend((right_start..=last_page).map(Some));

    pages
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PageWindow {
    pub pages: Vec<Option<usize>>,
    pub page: usize,
    pub total_pages: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

impl PageWindow {
    pub fn new(current_page: usize, total_pages: usize) -> Self {
        let current_page = current_page.max(1);
        let pages = get_pages(total_pages, current_page, 1, 2, 2, 1);

        Self {
            pages,
            page: current_page,
            total_pages,
            has_previous: current_page > 1,
            has_next: current_page < total_pages,
        }
    }

    /// A pager is only worth showing for more than one page.
    pub fn is_visible(&self) -> bool {
        self.total_pages > 1
    }

    pub fn previous(&self) -> Option<usize> {
        self.has_previous.then(|| self.page - 1)
    }

    pub fn next(&self) -> Option<usize> {
        self.has_next.then(|| self.page + 1)
    }
}

impl From<&SearchState> for PageWindow {
    fn from(state: &SearchState) -> Self {
        Self::new(state.current_page, state.total_pages())
    }
}
