//! Query parameter DTOs for paginated, searchable listings.

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::pagination::Paginator;
use crate::search::SearchQuery;

/// Query parameters for paginated, searchable resource listings.
///
/// # Pagination
/// `page` is 1-based; `limit` is the page size. Omitted or zero values fall
/// back to page 1 and the paginator's default limit.
///
/// # Searching
/// `search` is a free-text keyword matched case-insensitively against the
/// columns the endpoint chooses to expose.
#[derive(Deserialize, IntoParams, ToSchema, Default)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// 1-based page number.
    ///
    /// Example: `2`
    #[param(example = 2)]
    pub page: Option<u64>,
    /// Number of items per page.
    ///
    /// Example: `25`
    #[param(example = 25)]
    pub limit: Option<u64>,
    /// Free-text search keyword.
    ///
    /// Example: `ahmad`
    #[param(example = "ahmad")]
    pub search: Option<String>,
}

impl ListParams {
    /// Paginator for these parameters.
    #[must_use]
    pub fn paginator(&self) -> Paginator {
        Paginator::new(self.page.unwrap_or(1), self.limit.unwrap_or(0))
    }

    /// Search query for these parameters.
    #[must_use]
    pub fn search_query(&self) -> SearchQuery {
        SearchQuery::new("search", self.search.clone())
    }
}
