// Page-number buttons for the list footer

use std::fmt;

/// One slot in the pagination bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(u32),
    Ellipsis,
}

impl fmt::Display for PageItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageItem::Page(n) => write!(f, "{}", n),
            PageItem::Ellipsis => f.write_str("..."),
        }
    }
}

/// Number of pages needed for `total` items
pub fn total_pages(total: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(u64::from(page_size)) as u32
}

/// Buttons to show for `current` out of `total_pages`.
///
/// Up to five pages are all shown. Beyond that: first page, a window of one
/// page either side of the current one, last page, with an ellipsis standing
/// in for any gap.
pub fn page_items(total_pages: u32, current: u32) -> Vec<PageItem> {
    if total_pages <= 5 {
        return (1..=total_pages).map(PageItem::Page).collect();
    }

    let mut items = vec![PageItem::Page(1)];
    if current > 3 {
        items.push(PageItem::Ellipsis);
    }

    let start = current.saturating_sub(1).max(2);
    let end = current.saturating_add(1).min(total_pages - 1);
    items.extend((start..=end).map(PageItem::Page));

    if current < total_pages - 2 {
        items.push(PageItem::Ellipsis);
    }
    items.push(PageItem::Page(total_pages));
    items
}
