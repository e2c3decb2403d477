//! Page slicing for listing views.
//!
//! The backend returns whole lists; listing pages show one fixed-size window
//! of them. Pages are 1-based. A request past the last page shows the last
//! page, and page 0 shows the first.

/// One page of a larger list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl<T> Page<T> {
    /// Take page `page` of `items`, `per_page` items at a time.
    ///
    /// `per_page` of zero is treated as one.
    #[must_use]
    pub fn slice(items: Vec<T>, page: usize, per_page: usize) -> Self {
        let per_page = per_page.max(1);
        let total_items = items.len();
        let total_pages = total_items.div_ceil(per_page);
        let current_page = page.clamp(1, total_pages.max(1));
        let items = items
            .into_iter()
            .skip((current_page - 1) * per_page)
            .take(per_page)
            .collect();

        Self {
            items,
            current_page,
            total_pages,
            total_items,
        }
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// Page numbers to render as links, `1..=total_pages`.
    #[must_use]
    pub fn page_numbers(&self) -> Vec<usize> {
        (1..=self.total_pages).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        let page = Page::slice((1..=17).collect::<Vec<_>>(), 1, 8);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_items, 17);
        assert_eq!(page.items, (1..=8).collect::<Vec<_>>());
        assert!(page.has_next());
        assert!(!page.has_previous());
    }

    #[test]
    fn test_last_page_is_partial() {
        let page = Page::slice((1..=17).collect::<Vec<_>>(), 3, 8);
        assert_eq!(page.items, vec![17]);
        assert!(!page.has_next());
        assert!(page.has_previous());
    }

    #[test]
    fn test_out_of_range_pages_clamp() {
        let high = Page::slice((1..=12).collect::<Vec<_>>(), 99, 5);
        assert_eq!(high.current_page, 3);
        assert_eq!(high.items, vec![11, 12]);

        let zero = Page::slice((1..=12).collect::<Vec<_>>(), 0, 5);
        assert_eq!(zero.current_page, 1);
    }

    #[test]
    fn test_empty_list_has_no_pages() {
        let page = Page::slice(Vec::<u8>::new(), 4, 10);
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.current_page, 1);
        assert!(page.items.is_empty());
        assert!(page.page_numbers().is_empty());
    }
}
