//! Pagination utilities for service layer
//!
//! Page numbers are 1-based and the page size is fixed at [`PAGE_SIZE`].
//! The last page is always `total / per_page + 1`, so an exact multiple of the
//! page size leaves a trailing empty page; clients rely on that arithmetic for
//! the `last` link.

/// Records per page.
pub const PAGE_SIZE: u64 = 10;

/// Pagination parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page index
    pub page: u64,
    /// items per page
    pub per_page: u64,
}

/// `(offset, limit)` pair handed to the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: u64,
    pub limit: u64,
}

/// Page numbers of the navigation links for one page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageLinks {
    pub current: u64,
    pub last: u64,
    pub prev: Option<u64>,
    pub next: Option<u64>,
}

/// One page of results plus its navigation.
#[derive(Clone, Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub links: PageLinks,
}

impl Pagination {
    pub fn new(page: u64) -> Self {
        Self { page: page.max(1), per_page: PAGE_SIZE }
    }

    /// Coerce a raw `page` query value. Missing, blank, non-numeric or
    /// out-of-range values mean page 1; zero and negatives clamp to 1.
    pub fn from_query(raw: Option<&str>) -> Self {
        let page = raw
            .map(str::trim)
            .and_then(|s| s.parse::<i64>().ok())
            .filter(|p| *p <= i64::from(u32::MAX))
            .map(|p| p.max(1) as u64)
            .unwrap_or(1);
        Self::new(page)
    }

    pub fn window(&self) -> PageWindow {
        PageWindow { offset: self.per_page * (self.page - 1), limit: self.per_page }
    }

    pub fn links(&self, total: u64) -> PageLinks {
        let full_pages = total / self.per_page;
        PageLinks {
            current: self.page,
            last: last_page(total, self.per_page),
            prev: (self.page > 1).then(|| self.page - 1),
            next: (self.page - 1 < full_pages).then(|| self.page + 1),
        }
    }
}

impl Default for Pagination {
    fn default() -> Self { Self::new(1) }
}

pub fn last_page(total: u64, per_page: u64) -> u64 {
    total / per_page + 1
}
