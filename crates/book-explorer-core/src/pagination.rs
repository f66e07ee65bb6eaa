//! Offset pagination policy.

/// Default number of volumes requested per search call.
pub const DEFAULT_PAGE_SIZE: usize = 20;
/// The catalog rejects `maxResults` above this.
pub const MAX_PAGE_SIZE: usize = 40;

/// Fixed-size offset pagination with the "short page is the last page" rule.
///
/// `totalItems` from the catalog is not trusted for this decision (it is an
/// estimate that drifts between pages). The price is that a result set whose
/// size is an exact multiple of the page size costs one extra request that
/// comes back empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationPolicy {
    page_size: usize,
}

impl Default for PaginationPolicy {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PaginationPolicy {
    /// Page size is clamped to `1..=MAX_PAGE_SIZE`.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Whether another page may exist after one that returned `returned` items.
    pub fn may_have_more(&self, returned: usize) -> bool {
        returned == self.page_size
    }
}
