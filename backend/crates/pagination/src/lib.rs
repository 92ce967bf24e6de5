//! Page-number pagination primitives shared by list endpoints.
//!
//! A [`PageRequest`] carries a one-based page number and a page size. Once the
//! total number of matching records is known, [`PageRequest::links`] derives
//! the `next`/`prev` descriptors returned to clients.

use serde::{Deserialize, Serialize};

/// Page size applied when a client omits `limit`.
pub const DEFAULT_LIMIT: u32 = 25;

/// Largest page size a client may request.
pub const MAX_LIMIT: u32 = 100;

/// Errors raised while validating page parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageRequestError {
    /// The page number is not a positive integer.
    #[error("page must be a positive integer, got '{value}'")]
    InvalidPage {
        /// Raw value supplied by the caller.
        value: String,
    },
    /// The page size is not an integer between 1 and [`MAX_LIMIT`].
    #[error("limit must be an integer between 1 and {max}, got '{value}'")]
    InvalidLimit {
        /// Raw value supplied by the caller.
        value: String,
        /// Upper bound for the page size.
        max: u32,
    },
}

/// Validated page selection.
///
/// # Examples
/// ```
/// use pagination::PageRequest;
///
/// let request = PageRequest::parse(Some("2"), Some("10")).expect("valid page");
/// assert_eq!(request.offset(), 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Build a request from numeric parts.
    ///
    /// # Errors
    /// Returns [`PageRequestError`] when `page` is zero or `limit` falls
    /// outside `1..=MAX_LIMIT`.
    pub fn new(page: u32, limit: u32) -> Result<Self, PageRequestError> {
        if page == 0 {
            return Err(PageRequestError::InvalidPage {
                value: page.to_string(),
            });
        }
        if limit == 0 || limit > MAX_LIMIT {
            return Err(PageRequestError::InvalidLimit {
                value: limit.to_string(),
                max: MAX_LIMIT,
            });
        }
        Ok(Self { page, limit })
    }

    /// Parse optional query-string values, applying defaults when absent.
    ///
    /// # Errors
    /// Returns [`PageRequestError`] when a supplied value is not a valid
    /// positive integer in range.
    pub fn parse(page: Option<&str>, limit: Option<&str>) -> Result<Self, PageRequestError> {
        let page = match page {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|_| PageRequestError::InvalidPage {
                    value: raw.to_owned(),
                })?,
            None => 1,
        };
        let limit = match limit {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|_| PageRequestError::InvalidLimit {
                    value: raw.to_owned(),
                    max: MAX_LIMIT,
                })?,
            None => DEFAULT_LIMIT,
        };
        Self::new(page, limit)
    }

    /// One-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Number of records per page.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of records to skip before this page starts.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// Derive neighbouring page descriptors for a result set of `total` rows.
    ///
    /// # Examples
    /// ```
    /// use pagination::PageRequest;
    ///
    /// let links = PageRequest::new(2, 1).expect("valid").links(3);
    /// assert_eq!(links.next.map(|cursor| cursor.page), Some(3));
    /// assert_eq!(links.prev.map(|cursor| cursor.page), Some(1));
    /// ```
    #[must_use]
    pub fn links(&self, total: u64) -> PageLinks {
        let end = self.offset() + u64::from(self.limit);
        let next = (end < total).then(|| PageCursor {
            page: self.page + 1,
            limit: self.limit,
        });
        let prev = (self.offset() > 0).then(|| PageCursor {
            page: self.page - 1,
            limit: self.limit,
        });
        PageLinks { next, prev }
    }
}

/// Descriptor pointing at a neighbouring page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCursor {
    /// One-based page number.
    pub page: u32,
    /// Page size carried over from the originating request.
    pub limit: u32,
}

/// `next`/`prev` descriptors; absent when no such page exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLinks {
    /// The following page, when more records remain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageCursor>,
    /// The preceding page, when this is not the first page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageCursor>,
}

/// A slice of records together with the total count that matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Records on this page.
    pub items: Vec<T>,
    /// Number of records matching the query across all pages.
    pub total: u64,
    /// Neighbouring page descriptors.
    pub links: PageLinks,
}

impl<T> Page<T> {
    /// Assemble a page from fetched items and the matching total.
    #[must_use]
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            links: request.links(total),
        }
    }

    /// Transform each item while keeping the paging metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            links: self.links,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn defaults_apply_when_parameters_are_absent() {
        let request = PageRequest::parse(None, None).expect("defaults are valid");
        assert_eq!(request, PageRequest::default());
        assert_eq!(request.limit(), DEFAULT_LIMIT);
        assert_eq!(request.offset(), 0);
    }

    #[rstest]
    #[case(Some("0"), None)]
    #[case(Some("abc"), None)]
    #[case(Some("-1"), None)]
    #[case(None, Some("0"))]
    #[case(None, Some("101"))]
    #[case(None, Some("ten"))]
    fn rejects_out_of_range_values(#[case] page: Option<&str>, #[case] limit: Option<&str>) {
        assert!(PageRequest::parse(page, limit).is_err());
    }

    #[rstest]
    #[case(1, 1, 3, Some(2), None)]
    #[case(2, 1, 3, Some(3), Some(1))]
    #[case(3, 1, 3, None, Some(2))]
    #[case(1, 25, 10, None, None)]
    #[case(4, 25, 10, None, Some(3))]
    fn links_follow_total(
        #[case] page: u32,
        #[case] limit: u32,
        #[case] total: u64,
        #[case] next: Option<u32>,
        #[case] prev: Option<u32>,
    ) {
        let links = PageRequest::new(page, limit).expect("valid request").links(total);
        assert_eq!(links.next.map(|cursor| cursor.page), next);
        assert_eq!(links.prev.map(|cursor| cursor.page), prev);
    }

    #[rstest]
    fn links_serialise_without_absent_neighbours() {
        let links = PageRequest::new(1, 2).expect("valid request").links(5);
        let value = serde_json::to_value(links).expect("serialise links");
        assert_eq!(value, serde_json::json!({ "next": { "page": 2, "limit": 2 } }));
    }
}
