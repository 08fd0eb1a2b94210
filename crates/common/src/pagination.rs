//! Clamped offset pagination.
//!
//! Out-of-range page requests resolve to the nearest valid page instead of
//! erroring: a token that does not parse as a positive integer means page 1,
//! and a page number past the end means the last page.

use serde::Serialize;

/// A raw page token as it arrives from the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageToken {
    /// No token supplied.
    Missing,
    /// A parsed 1-based page number.
    Number(u64),
    /// A token that did not parse as a positive integer.
    Invalid,
}

impl PageToken {
    /// Parse an optional raw query value into a token.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            None => Self::Missing,
            Some(s) => match s.trim().parse::<u64>() {
                Ok(n) if n >= 1 => Self::Number(n),
                _ => Self::Invalid,
            },
        }
    }
}

impl From<Option<&str>> for PageToken {
    fn from(raw: Option<&str>) -> Self {
        Self::parse(raw)
    }
}

/// A resolved page of items with pagination metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T: Serialize> {
    /// Items on this page.
    pub items: Vec<T>,
    /// The 1-based page number actually served (after clamping).
    pub page: u64,
    /// Total number of pages (at least 1).
    pub total_pages: u64,
    /// Total number of items across all pages.
    pub total_items: u64,
    /// Page size used for the query.
    pub page_size: u64,
}

impl<T: Serialize> Page<T> {
    /// Assemble a page envelope from query results.
    #[must_use]
    pub fn new(items: Vec<T>, page: u64, total_items: u64, page_size: u64) -> Self {
        Self {
            items,
            page,
            total_pages: total_pages(total_items, page_size),
            total_items,
            page_size,
        }
    }
}

/// Number of pages needed for `total_items` items. Always at least 1, so an
/// empty catalog still has a valid page 1.
#[must_use]
pub fn total_pages(total_items: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 1;
    }
    total_items.div_ceil(page_size).max(1)
}

/// Resolve a page token against the catalog size.
///
/// Returns the clamped 1-based page number and the row offset to query at.
#[must_use]
pub fn resolve_page(token: &PageToken, total_items: u64, page_size: u64) -> (u64, u64) {
    let last = total_pages(total_items, page_size);
    let page = match token {
        PageToken::Missing | PageToken::Invalid => 1,
        PageToken::Number(n) => (*n).min(last),
    };
    (page, (page - 1) * page_size)
}
