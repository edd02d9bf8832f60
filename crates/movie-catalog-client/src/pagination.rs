//! Result counting and page navigation over the catalog listings
//!
//! The catalog reports how many pages a query spans but not how many items.
//! [ResultsInfo::reconcile] recovers the exact count from the last page of
//! the result set, assuming every other page holds exactly `limit` items.

use core::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::ListingPage;

/// The number of page buttons shown around the current page
pub const MAX_VISIBLE_PAGES: u32 = 5;

/// The "start-end of total" range displayed for the current page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultsInfo {
    pub start: u64,
    pub end: u64,
    pub total: u64,
}

impl ResultsInfo {
    /// Compute the displayed range of `current` and the exact total of the
    /// result set
    ///
    /// `current` may be absent while the page is loading, in which case
    /// everything is 0. `last` is the last page of the same result set; while
    /// it is absent the total is 0.
    pub fn reconcile<T, U>(
        current: Option<&ListingPage<T>>,
        last: Option<&ListingPage<U>>,
        page: u32,
        limit: u32,
    ) -> Self {
        let Some(current) = current else {
            return Self::default();
        };
        let limit = limit as u64;
        let start = (page.max(1) as u64 - 1) * limit + 1;
        // end == start - 1 when the page is empty
        let end = start + current.data.len() as u64 - 1;
        let total = last
            .map(|last| {
                (current.total_pages as u64).saturating_sub(1) * limit + last.data.len() as u64
            })
            .unwrap_or(0);
        Self { start, end, total }
    }

    /// The human readable range, `None` when there is no count to show or
    /// the page holds nothing
    pub fn summary(&self) -> Option<String> {
        (self.total > 0 && self.end >= self.start).then(|| {
            format!(
                "Showing results {}-{} of {}",
                self.start, self.end, self.total
            )
        })
    }
}

/// The page numbers to offer around `current`
///
/// At most [MAX_VISIBLE_PAGES] pages, centred on `current` when possible and
/// always within `1..=total_pages`. A `current` past the last page is
/// treated as the last page. Empty when `total_pages` is 0.
pub fn page_window(current: u32, total_pages: u32) -> RangeInclusive<u32> {
    if total_pages == 0 {
        return 1..=0;
    }
    let current = current.clamp(1, total_pages);
    let half_visible = MAX_VISIBLE_PAGES / 2;
    let start = current.saturating_sub(half_visible).max(1);
    let end = total_pages.min(start.saturating_add(MAX_VISIBLE_PAGES - 1));
    // Near the last page, extend the window backwards
    let start = start.min(end.saturating_sub(MAX_VISIBLE_PAGES - 1).max(1));
    start..=end
}

/// Navigation controls for a multi-page result set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationControls {
    pub current: u32,
    pub total_pages: u32,
    pub pages: Vec<u32>,
    /// `None` on the first page, the last page when `current` is past it
    pub previous: Option<u32>,
    /// `None` on the last page
    pub next: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl PaginationControls {
    /// Returns `None` if the result set fits on a single page
    pub fn new(current: u32, total_pages: u32, results: &ResultsInfo) -> Option<Self> {
        if total_pages <= 1 {
            return None;
        }
        Some(Self {
            current,
            total_pages,
            pages: page_window(current, total_pages).collect(),
            previous: (current > 1).then(|| current.min(total_pages.saturating_add(1)) - 1),
            next: (current < total_pages).then(|| current + 1),
            summary: results.summary(),
        })
    }
}
