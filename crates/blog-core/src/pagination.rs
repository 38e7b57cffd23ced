//! Page-number pagination.

/// A 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

impl PageRequest {
    /// `page` and `page_size` are clamped to at least 1.
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

/// One page of results plus the total number of matches.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub count: u64,
    pub request: PageRequest,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, count: u64, request: PageRequest) -> Self {
        Self {
            items,
            count,
            request,
        }
    }

    /// Total number of pages. An empty result still has one (empty) page.
    pub fn num_pages(&self) -> u64 {
        self.count.div_ceil(self.request.page_size).max(1)
    }

    /// Past the last page. Page 1 is always in range.
    pub fn is_out_of_range(&self) -> bool {
        self.request.page > self.num_pages()
    }

    pub fn has_next(&self) -> bool {
        self.request.page < self.num_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.request.page > 1
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            count: self.count,
            request: self.request,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset() {
        assert_eq!(PageRequest::new(1, 10).offset(), 0);
        assert_eq!(PageRequest::new(3, 10).offset(), 20);
        assert_eq!(PageRequest::new(0, 0), PageRequest::new(1, 1));
    }

    #[test]
    fn test_page_navigation() {
        let page = Page::new(vec![1, 2], 12, PageRequest::new(2, 5));
        assert_eq!(page.num_pages(), 3);
        assert!(page.has_next());
        assert!(page.has_previous());
        assert!(!page.is_out_of_range());

        let last = Page::new(vec![1, 2], 12, PageRequest::new(3, 5));
        assert!(!last.has_next());
    }

    #[test]
    fn test_empty_first_page_is_in_range() {
        let page: Page<i32> = Page::new(vec![], 0, PageRequest::new(1, 10));
        assert!(!page.is_out_of_range());
        assert!(!page.has_next());
        assert!(!page.has_previous());

        let beyond: Page<i32> = Page::new(vec![], 0, PageRequest::new(2, 10));
        assert!(beyond.is_out_of_range());
    }
}
