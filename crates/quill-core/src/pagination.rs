//! Page slicing with an explicit overflow signal.
//!
//! The boundary takes the full ordered, filtered collection and either
//! returns the requested slice with page metadata or reports that the page
//! is out of range. Overflow is a recoverable condition the caller turns
//! into a redirect, never a failure.

use serde::Serialize;
use thiserror::Error;

/// Default items per page for listings.
pub const DEFAULT_PAGE_SIZE: u64 = 5;

/// Requested page is beyond the last available page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("page {requested} is out of range (last page is {available})")]
pub struct PageOverflow {
    pub requested: u64,
    pub available: u64,
}

/// One page of results plus totals.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
    pub total_items: u64,
}

/// Slice `items` down to the requested 1-based page.
///
/// An empty collection still has one (empty) page, so page 1 always
/// succeeds; overflow starts past the last page. Page 0 is out of range.
pub fn paginate<T>(items: Vec<T>, page: u64, per_page: u64) -> Result<Page<T>, PageOverflow> {
    debug_assert!(per_page > 0);

    let total_items = items.len() as u64;
    let total_pages = total_items.div_ceil(per_page).max(1);

    if page == 0 || page > total_pages {
        return Err(PageOverflow {
            requested: page,
            available: total_pages,
        });
    }

    let start = ((page - 1) * per_page) as usize;
    let items: Vec<T> = items
        .into_iter()
        .skip(start)
        .take(per_page as usize)
        .collect();

    Ok(Page {
        items,
        page,
        per_page,
        total_pages,
        total_items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slices_twelve_items_into_pages_of_five() {
        let items: Vec<u32> = (1..=12).collect();

        let first = paginate(items.clone(), 1, 5).unwrap();
        assert_eq!(first.items, vec![1, 2, 3, 4, 5]);
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.total_items, 12);

        let last = paginate(items.clone(), 3, 5).unwrap();
        assert_eq!(last.items, vec![11, 12]);

        let overflow = paginate(items, 4, 5).unwrap_err();
        assert_eq!(overflow.requested, 4);
        assert_eq!(overflow.available, 3);
    }

    #[test]
    fn empty_collection_has_one_empty_page() {
        let page = paginate(Vec::<u32>::new(), 1, 5).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.total_items, 0);

        assert!(paginate(Vec::<u32>::new(), 2, 5).is_err());
    }

    #[test]
    fn page_zero_is_out_of_range() {
        let err = paginate(vec![1, 2, 3], 0, 5).unwrap_err();
        assert_eq!(err.requested, 0);
    }

    #[test]
    fn exact_multiple_has_no_trailing_page() {
        let items: Vec<u32> = (1..=10).collect();
        assert_eq!(paginate(items.clone(), 2, 5).unwrap().items, vec![6, 7, 8, 9, 10]);
        assert!(paginate(items, 3, 5).is_err());
    }
}
