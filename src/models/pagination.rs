/// Pagination parameters as supplied by the caller.
/// Missing, zero, negative or unparsable values fall back to the defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct PaginationParams {
    pub per_page: Option<i64>,
    pub page: Option<i64>,
}

/// Skip/limit window handed to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub skip: i64,
    pub limit: i64,
}

/// Resolved pagination: what is reported back, plus the window to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPagination {
    pub page: i64,
    pub per_page: i64,
    pub window: Option<PageWindow>,
}

impl PaginationParams {
    pub const DEFAULT_PER_PAGE: i64 = 100;
    pub const DEFAULT_PAGE: i64 = 1;

    pub fn new(per_page: Option<i64>, page: Option<i64>) -> Self {
        Self { per_page, page }
    }

    pub fn resolve(&self) -> ResolvedPagination {
        let per_page = positive_or(self.per_page, Self::DEFAULT_PER_PAGE);
        let page = positive_or(self.page, Self::DEFAULT_PAGE);

        ResolvedPagination {
            page,
            per_page,
            window: window(per_page, page),
        }
    }
}

fn positive_or(value: Option<i64>, default: i64) -> i64 {
    value.filter(|v| *v > 0).unwrap_or(default)
}

/// The window only applies when both values are strictly positive.
fn window(per_page: i64, page: i64) -> Option<PageWindow> {
    if per_page <= 0 || page <= 0 {
        return None;
    }
    // Skip clamps to i64::MAX so an overflowing page lands past the end
    let skip = per_page.saturating_mul(page - 1);
    Some(PageWindow { skip, limit: per_page })
}
