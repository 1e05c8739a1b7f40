//! Page-based pagination for list endpoints.

use serde::{Deserialize, Serialize};

/// Default page size.
pub const DEFAULT_PER_PAGE: u32 = 20;

/// Largest page size a client may request.
pub const MAX_PER_PAGE: u32 = 60;

/// `?page=&perPage=` query parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// A normalized page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// One-based page number.
    pub number: u32,
    pub per_page: u32,
}

impl Page {
    /// Normalize raw parameters: page is at least 1, size is within `1..=MAX_PER_PAGE`.
    #[must_use]
    pub fn from_params(params: PageParams) -> Self {
        Self {
            number: params.page.unwrap_or(1).max(1),
            per_page: params
                .per_page
                .unwrap_or(DEFAULT_PER_PAGE)
                .clamp(1, MAX_PER_PAGE),
        }
    }

    /// SQL `LIMIT`.
    #[must_use]
    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    /// SQL `OFFSET`.
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.number - 1) * i64::from(self.per_page)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::from_params(PageParams::default())
    }
}

impl From<PageParams> for Page {
    fn from(params: PageParams) -> Self {
        Self::from_params(params)
    }
}

/// One page of results with totals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
    pub total_pages: i64,
}

impl<T> Paginated<T> {
    /// Wrap `items` fetched for `page` out of `total` matching rows.
    #[must_use]
    pub fn new(items: Vec<T>, page: Page, total: i64) -> Self {
        let per_page = i64::from(page.per_page);
        let total = total.max(0);
        Self {
            items,
            page: page.number,
            per_page: page.per_page,
            total,
            total_pages: (total + per_page - 1) / per_page,
        }
    }

    /// Map the items, keeping the page metadata.
    #[must_use]
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_normalization() {
        let page = Page::from_params(PageParams {
            page: Some(0),
            per_page: Some(500),
        });
        assert_eq!(page.number, 1);
        assert_eq!(page.per_page, MAX_PER_PAGE);
        assert_eq!(page.offset(), 0);

        let page = Page::from_params(PageParams {
            page: Some(3),
            per_page: Some(10),
        });
        assert_eq!(page.limit(), 10);
        assert_eq!(page.offset(), 20);
    }

    #[test]
    fn test_total_pages() {
        let page = Page::default();
        assert_eq!(Paginated::<i32>::new(vec![], page, 0).total_pages, 0);
        assert_eq!(Paginated::<i32>::new(vec![], page, 20).total_pages, 1);
        assert_eq!(Paginated::<i32>::new(vec![], page, 21).total_pages, 2);
    }

    #[test]
    fn test_map_keeps_metadata() {
        let paged = Paginated::new(vec![1, 2], Page::default(), 42).map(|n| n * 10);
        assert_eq!(paged.items, [10, 20]);
        assert_eq!(paged.total, 42);
    }
}
