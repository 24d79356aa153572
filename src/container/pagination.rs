use serde::{Deserialize, Serialize};

/// Pagination of the rows shown by a data set
///
/// The descriptor is computed by the query layer, a data set only renders it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pagination {
    pub total_records: u64,
    pub total_pages: u64,
    pub current_page: u64,
    pub first_record: u64,
    pub last_record: u64,
}

/// How many page links surround the current page
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationWindow {
    /// Pages always shown at each end
    pub num_end: u64,
    /// Pages shown before the current one
    pub num_before: u64,
    /// Pages shown after the current one
    pub num_after: u64,
}

impl Default for PaginationWindow {
    fn default() -> Self {
        PaginationWindow {
            num_end: 2,
            num_before: 5,
            num_after: 4,
        }
    }
}

/// An entry of the page link list
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageLink {
    Page(u64),
    /// One or more pages left out
    Gap,
}

impl Pagination {
    /// Compute the page links to render, in ascending order
    ///
    /// The first and last `num_end` pages are always listed, pages around the current one are
    /// listed according to the window, and every run of left out pages collapses into a single
    /// [`PageLink::Gap`].
    pub fn page_links(&self, window: &PaginationWindow) -> Vec<PageLink> {
        let total = self.total_pages as i64;
        if total < 1 {
            return Vec::new();
        }
        let current = self.current_page as i64;
        let (num_end, num_before, num_after) = (
            window.num_end as i64,
            window.num_before as i64,
            window.num_after as i64,
        );
        let mid = num_before + num_after;
        let end = num_after + num_end;

        let (from, to) = if current < mid {
            (1, if total > mid + 1 { mid + 1 } else { total })
        } else if total - current < end && total > mid {
            (total - mid, total)
        } else if current < end {
            (1, if total > mid + 1 { current + num_after } else { total })
        } else {
            (current - num_before, current - num_before + mid)
        };

        let mut pages: Vec<i64> = (from..=to).collect();
        if num_end > 0 {
            pages.extend(1..=num_end);
            pages.extend(total - num_end + 1..=total);
        }
        pages.retain(|p| (1..=total).contains(p));
        pages.sort_unstable();
        pages.dedup();

        let mut links = Vec::new();
        let mut previous = 0;
        for page in pages {
            if page != previous + 1 {
                links.push(PageLink::Gap);
            }
            links.push(PageLink::Page(page as u64));
            previous = page;
        }
        links
    }
}
