//! Pagination math and Content-Range header generation.

use axum::http::header::HeaderMap;
use serde::Serialize;
use utoipa::ToSchema;

const DEFAULT_LIMIT: u64 = 100;

/// Page/limit bookkeeping for a paginated listing.
///
/// The page is 1-based and clamped to at least 1. A zero limit falls back
/// to the default limit. Once the total count is known (`set_count`), the
/// page is re-clamped so that requesting a page past the end lands on the
/// last page instead of an empty one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginator {
    page: u64,
    limit: u64,
    default_limit: u64,
    count: u64,
}

impl Paginator {
    #[must_use]
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: page.max(1),
            limit,
            default_limit: DEFAULT_LIMIT,
            count: 0,
        }
    }

    /// Overrides the fallback limit used when the requested limit is 0.
    pub fn set_default_limit(&mut self, default_limit: u64) -> &mut Self {
        self.default_limit = default_limit.max(1);
        self
    }

    #[must_use]
    pub fn page(&self) -> u64 {
        self.page
    }

    /// Effective page size; never 0.
    #[must_use]
    pub fn limit(&self) -> u64 {
        if self.limit > 0 {
            self.limit
        } else {
            self.default_limit
        }
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Records the total count and clamps the page into range.
    pub fn set_count(&mut self, count: u64) -> &mut Self {
        self.count = count;
        if self.page > self.max_page() {
            self.page = self.max_page();
        }
        self
    }

    /// Highest valid page number; at least 1 even for an empty result.
    #[must_use]
    pub fn max_page(&self) -> u64 {
        self.count.div_ceil(self.limit()).max(1)
    }

    /// 0-based offset of the current page for query building.
    #[must_use]
    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.limit()
    }

    /// 1-based ordinal of the first item on the page; 0 when empty.
    #[must_use]
    pub fn first_item(&self) -> u64 {
        if self.count == 0 {
            0
        } else {
            (self.page - 1) * self.limit() + 1
        }
    }

    /// 1-based ordinal of the last item on the page; 0 when empty.
    #[must_use]
    pub fn last_item(&self) -> u64 {
        if self.count == 0 {
            0
        } else {
            (self.page * self.limit()).min(self.count)
        }
    }

    /// Snapshot of the pagination numbers for API consumers.
    #[must_use]
    pub fn meta(&self) -> PageMeta {
        PageMeta {
            page: self.page,
            limit: self.limit(),
            count: self.count,
            max_page: self.max_page(),
            from: self.first_item(),
            to: self.last_item(),
        }
    }

    /// Content-Range headers for the current page.
    #[must_use]
    pub fn content_range(&self, resource_name: &str) -> HeaderMap {
        calculate_content_range(self.offset(), self.limit(), self.count, resource_name)
    }
}

/// Serializable pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PageMeta {
    /// Current 1-based page.
    pub page: u64,
    /// Effective page size.
    pub limit: u64,
    /// Total number of items across all pages.
    pub count: u64,
    /// Highest valid page number.
    pub max_page: u64,
    /// 1-based ordinal of the first item on the page; 0 when empty.
    pub from: u64,
    /// 1-based ordinal of the last item on the page; 0 when empty.
    pub to: u64,
}

/// Remove control characters so resource names cannot inject headers.
fn sanitize_resource_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii() && !c.is_ascii_control())
        .collect()
}

/// Builds the Content-Range header for a page of results.
#[must_use]
pub fn calculate_content_range(
    offset: u64,
    limit: u64,
    total_count: u64,
    resource_name: &str,
) -> HeaderMap {
    let max_offset_limit = (offset + limit).saturating_sub(1).min(total_count);
    let safe_name = sanitize_resource_name(resource_name);
    let content_range = format!("{safe_name} {offset}-{max_offset_limit}/{total_count}");

    let mut headers = HeaderMap::new();
    if let Ok(value) = content_range.parse() {
        headers.insert("Content-Range", value);
    } else {
        headers.insert(
            "Content-Range",
            format!("items {offset}-{max_offset_limit}/{total_count}")
                .parse()
                .unwrap_or_else(|_| "items 0-0/0".parse().unwrap()),
        );
    }
    headers
}
