//! Paginated listing: request validation, store plan, response envelope.

use serde::{Deserialize, Serialize};

use super::CatalogError;
use crate::movie::{MovieFilter, MovieSort, SortDirection, SortField};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;

/// Listing request as received from a caller. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub page: Option<u64>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_order: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
}

impl ListQuery {
    /// Check ranges and names, then resolve defaults into a plan.
    pub fn validate(&self) -> Result<QueryPlan, CatalogError> {
        let page = self.page.unwrap_or(DEFAULT_PAGE);
        if page < 1 {
            return Err(CatalogError::InvalidQuery(
                "page must be at least 1".to_string(),
            ));
        }

        let limit = self.limit.unwrap_or(DEFAULT_LIMIT);
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(CatalogError::InvalidQuery(format!(
                "limit must be between 1 and {}",
                MAX_LIMIT
            )));
        }

        let field = match self.sort_by.as_deref() {
            None => SortField::default(),
            Some(name) => SortField::parse(name).ok_or_else(|| {
                CatalogError::InvalidQuery(format!("unknown sort field: {}", name))
            })?,
        };

        let direction = match self.sort_order.as_deref() {
            None => SortDirection::default(),
            Some(name) => SortDirection::parse(&name.to_ascii_lowercase()).ok_or_else(|| {
                CatalogError::InvalidQuery(format!("sort_order must be asc or desc, got {}", name))
            })?,
        };

        let filter = match self.search.as_deref() {
            Some(term) if !term.trim().is_empty() => MovieFilter::Search(term.to_string()),
            _ => MovieFilter::All,
        };

        Ok(QueryPlan {
            page,
            limit,
            filter,
            sort: MovieSort { field, direction },
        })
    }
}

/// A validated listing request ready to run against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    pub page: u64,
    pub limit: u64,
    pub filter: MovieFilter,
    pub sort: MovieSort,
}

impl QueryPlan {
    /// Rows to skip. `None` when the page starts beyond any addressable row.
    pub fn offset(&self) -> Option<u64> {
        (self.page - 1).checked_mul(self.limit)
    }
}

/// Pagination metadata returned with every page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl PageMeta {
    pub fn compute(page: u64, limit: u64, total: u64) -> Self {
        let total_pages = total.div_ceil(limit);
        Self {
            page,
            limit,
            total,
            total_pages,
            has_next: page < total_pages,
            has_previous: page > 1,
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}
