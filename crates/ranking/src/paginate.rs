use crate::types::SearchError;

/// Validated 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: usize,
    limit: usize,
}

impl Pagination {
    /// Rejects `page < 1` and `limit < 1`.
    pub fn new(page: usize, limit: usize) -> Result<Self, SearchError> {
        if page < 1 {
            return Err(SearchError::invalid("page", "must be at least 1"));
        }
        if limit < 1 {
            return Err(SearchError::invalid("limit", "must be at least 1"));
        }
        Ok(Self { page, limit })
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// `(page - 1) * limit`, saturating for absurd page numbers.
    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// The requested window of `items` plus the full length.
    ///
    /// Pages past the end are empty, not an error.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> (&'a [T], usize) {
        let total = items.len();
        let start = self.offset().min(total);
        let end = start.saturating_add(self.limit).min(total);
        (&items[start..end], total)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}
