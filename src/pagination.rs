//! Page-size menu reduction and page clamping.
//!
//! The menu offered to the user shrinks with the row count: only sizes up
//! to the smallest option that exceeds the count are worth offering, and
//! a row count larger than every option keeps the full menu.

use serde::{Deserialize, Serialize};

/// Default page-size menu, ascending.
pub const PAGE_SIZE_OPTIONS: [u64; 5] = [50, 100, 200, 500, 1000];

/// The pagination control to render: the reduced size menu plus the
/// resolved size and 1-indexed page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMenu {
    pub sizes: Vec<u64>,
    pub page_size: u64,
    pub page: u64,
    pub page_count: u64,
    pub total_rows: u64,
}

impl PageMenu {
    /// Offset of the first row of the current page.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page - 1) * self.page_size
    }
}

/// Resolve the pagination control for a row count and requested position.
///
/// A requested size outside the reduced menu falls back to the menu's
/// first entry; the requested page clamps to the valid range. Zero rows
/// offer only the smallest size with the page forced to 1.
#[must_use]
pub fn paginate(
    total_rows: u64,
    sizes: &[u64],
    requested_size: Option<u64>,
    requested_page: u64,
) -> PageMenu {
    let sizes = reduce_menu(total_rows, sizes);
    let page_size = requested_size
        .filter(|size| sizes.contains(size))
        .unwrap_or(sizes[0]);
    let page_count = if total_rows == 0 {
        1
    } else {
        total_rows.div_ceil(page_size)
    };
    let page = requested_page.clamp(1, page_count);

    PageMenu {
        sizes,
        page_size,
        page,
        page_count,
        total_rows,
    }
}

/// All sizes up to the smallest option exceeding the row count, or the
/// full menu when even the largest option does not exceed it.
fn reduce_menu(total_rows: u64, sizes: &[u64]) -> Vec<u64> {
    let sizes = if sizes.is_empty() {
        &PAGE_SIZE_OPTIONS
    } else {
        sizes
    };
    let last = sizes
        .iter()
        .copied()
        .find(|&size| size > total_rows)
        .unwrap_or_else(|| *sizes.last().expect("menu is non-empty"));
    sizes.iter().copied().filter(|&size| size <= last).collect()
}
