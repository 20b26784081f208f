//! Pagination metadata and the "Showing X to Y of Z" range under every table.

use serde::{Deserialize, Serialize};

/// Pagination block returned alongside every collection (pages are 1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl PageMeta {
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            total.div_ceil(limit as u64) as u32
        };
        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }

    /// 1-based inclusive bounds of the rows on this page, or `None` when
    /// there is nothing to show.
    pub fn display_range(&self) -> Option<(u64, u64)> {
        if self.total == 0 || self.limit == 0 || self.page == 0 {
            return None;
        }
        let first = (self.page as u64 - 1) * self.limit as u64 + 1;
        if first > self.total {
            return None;
        }
        let last = (self.page as u64 * self.limit as u64).min(self.total);
        Some((first, last))
    }

    /// `"21 to 40 of 45"`. `None` for an empty collection or a page past the
    /// end, so the label can be hidden.
    pub fn range_label(&self) -> Option<String> {
        self.display_range()
            .map(|(first, last)| format!("{} to {} of {}", first, last, self.total))
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Controls are only rendered when there is more than one page.
    pub fn is_paginated(&self) -> bool {
        self.total_pages > 1
    }
}

/// One page of items plus its pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: PageMeta,
}

impl<T> Page<T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_middle_page_range() {
        let meta = PageMeta {
            page: 2,
            limit: 20,
            total: 45,
            total_pages: 3,
        };
        assert_eq!(meta.display_range(), Some((21, 40)));
        assert_eq!(meta.range_label().as_deref(), Some("21 to 40 of 45"));
        assert!(meta.has_previous());
        assert!(meta.has_next());
    }

    #[test]
    fn test_last_page_is_clamped() {
        let meta = PageMeta::new(3, 20, 45);
        assert_eq!(meta.total_pages, 3);
        assert_eq!(meta.range_label().as_deref(), Some("41 to 45 of 45"));
        assert!(meta.has_previous());
        assert!(!meta.has_next());
    }

    #[test]
    fn test_first_page() {
        let meta = PageMeta::new(1, 20, 45);
        assert_eq!(meta.range_label().as_deref(), Some("1 to 20 of 45"));
        assert!(!meta.has_previous());
        assert!(meta.has_next());
    }

    #[test]
    fn test_empty_collection() {
        let meta = PageMeta::new(1, 20, 0);
        assert_eq!(meta.total_pages, 0);
        assert_eq!(meta.display_range(), None);
        assert_eq!(meta.range_label(), None);
        assert!(!meta.has_next());
        assert!(!meta.is_paginated());
    }

    #[test]
    fn test_page_past_the_end() {
        let meta = PageMeta::new(5, 20, 45);
        assert_eq!(meta.display_range(), None);
        assert_eq!(meta.range_label(), None);
        assert!(!meta.has_next());
        assert!(meta.has_previous());
    }
}
