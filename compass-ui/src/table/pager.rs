//! Pagination arithmetic and the condensed page-button window.

/// How many page numbers are shown on each side of the current page.
pub const PAGE_RADIUS: usize = 2;

/// Summary text shown when there are no rows.
pub const NO_DATA: &str = "No data";

/// One control in the pagination bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageControl {
    /// Go back one page.
    Previous { target: usize, disabled: bool },
    /// Jump directly to a page.
    Page { number: usize, current: bool },
    /// Gap between the condensed window and the first/last page.
    Ellipsis,
    /// Go forward one page.
    Next { target: usize, disabled: bool },
}

impl PageControl {
    /// The page this control navigates to, if it is clickable.
    pub fn target(&self) -> Option<usize> {
        match *self {
            PageControl::Previous { target, disabled } | PageControl::Next { target, disabled } => {
                (!disabled).then_some(target)
            }
            PageControl::Page { number, .. } => Some(number),
            PageControl::Ellipsis => None,
        }
    }

    /// Button label.
    pub fn label(&self) -> String {
        match self {
            PageControl::Previous { .. } => "Previous".to_string(),
            PageControl::Page { number, .. } => number.to_string(),
            PageControl::Ellipsis => "...".to_string(),
            PageControl::Next { .. } => "Next".to_string(),
        }
    }
}

/// Number of pages needed for `total` rows; never less than one.
pub fn page_count(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1)).max(1)
}

/// Zero-based half-open row window for a 1-based page.
pub fn window(page: usize, page_size: usize, total: usize) -> (usize, usize) {
    let start = page.saturating_sub(1).saturating_mul(page_size).min(total);
    let end = start.saturating_add(page_size).min(total);
    (start, end)
}

/// Human-readable summary for a window.
pub fn summary(start: usize, end: usize, total: usize) -> String {
    if total == 0 {
        NO_DATA.to_string()
    } else {
        format!("Showing {} to {} of {} entries", start + 1, end, total)
    }
}

/// Build the pagination bar for `current` out of `pages`.
///
/// A single page produces no controls.
pub fn page_controls(current: usize, pages: usize) -> Vec<PageControl> {
    if pages <= 1 {
        return Vec::new();
    }

    let mut controls = Vec::new();
    controls.push(PageControl::Previous {
        target: current.saturating_sub(1).max(1),
        disabled: current <= 1,
    });

    let first = current.saturating_sub(PAGE_RADIUS).max(1);
    let last = (current + PAGE_RADIUS).min(pages);

    if first > 1 {
        controls.push(PageControl::Page {
            number: 1,
            current: false,
        });
        if first > 2 {
            controls.push(PageControl::Ellipsis);
        }
    }

    for number in first..=last {
        controls.push(PageControl::Page {
            number,
            current: number == current,
        });
    }

    if last < pages {
        if last + 1 < pages {
            controls.push(PageControl::Ellipsis);
        }
        controls.push(PageControl::Page {
            number: pages,
            current: false,
        });
    }

    controls.push(PageControl::Next {
        target: (current + 1).min(pages),
        disabled: current >= pages,
    });
    controls
}
