//! List query model: filter predicate, sort key/direction, pagination cursor.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Page sizes the list endpoint accepts.
pub const PAGE_SIZES: &[u32] = &[5, 10, 20, 50];

/// Default number of records per page.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Pages are 1-based.
pub const FIRST_PAGE: u32 = 1;

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

/// Field the listing is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Id,
    Title,
    Year,
    Rating,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Title => "title",
            Self::Year => "year",
            Self::Rating => "rating",
        }
    }

    /// Parse a wire/user value. Returns `None` for unknown fields.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "id" => Some(Self::Id),
            "title" => Some(Self::Title),
            "year" => Some(Self::Year),
            "rating" => Some(Self::Rating),
            _ => None,
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Filter & query
// ---------------------------------------------------------------------------

/// The filter/sort form the user applies as a unit.
///
/// Empty text fields and unset numeric fields mean "no filter" and are
/// omitted from the outgoing request entirely.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// Substring match on the title.
    pub title: String,
    /// Substring match on the director.
    pub director: String,
    /// Exact release-year match.
    pub year: Option<i32>,
    /// Keep records rated at least this value.
    pub min_rating: Option<f64>,
    pub sort_by: SortKey,
    pub order: SortOrder,
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            title: String::new(),
            director: String::new(),
            year: None,
            min_rating: None,
            sort_by: SortKey::Id,
            order: SortOrder::Asc,
        }
    }
}

/// Combined filter/sort/pagination parameters for the list endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub filter: Filter,
    /// Current page, 1-based.
    pub page: u32,
    /// Records per page; must be one of [`PAGE_SIZES`].
    pub page_size: u32,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            filter: Filter::default(),
            page: FIRST_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ListQuery {
    /// Whether `size` is one of the accepted page sizes.
    pub fn is_allowed_page_size(size: u32) -> bool {
        PAGE_SIZES.contains(&size)
    }

    /// Client-side guard, checked before any network round-trip.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.page < FIRST_PAGE {
            return Err(ApiError::InvalidQuery(format!(
                "page must be at least {FIRST_PAGE}"
            )));
        }
        if !Self::is_allowed_page_size(self.page_size) {
            return Err(ApiError::InvalidQuery(format!(
                "page size must be one of {PAGE_SIZES:?}, got {}",
                self.page_size
            )));
        }
        Ok(())
    }

    /// Build the outgoing query-string pairs.
    ///
    /// Empty text filters and unset numeric filters are omitted; sort and
    /// pagination parameters are always sent.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(8);

        if !self.filter.title.is_empty() {
            params.push(("title", self.filter.title.clone()));
        }
        if !self.filter.director.is_empty() {
            params.push(("director", self.filter.director.clone()));
        }
        if let Some(year) = self.filter.year {
            params.push(("year", year.to_string()));
        }
        if let Some(min_rating) = self.filter.min_rating {
            params.push(("min_rating", min_rating.to_string()));
        }

        params.push(("sort_by", self.filter.sort_by.as_str().to_string()));
        params.push(("order", self.filter.order.as_str().to_string()));
        params.push(("page", self.page.to_string()));
        params.push(("limit", self.page_size.to_string()));

        params
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
