//! Paging and sorting input for list queries, and the page metadata derived from it.

use crate::domain::validator::{permitted_value, Checker};
use serde::Serialize;
use utoipa::ToSchema;

pub const MAX_PAGE: i64 = 10_000_000;
pub const MAX_PAGE_SIZE: i64 = 100;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const DEFAULT_SORT: &str = "id";

/// Sort tokens accepted by the herb list endpoint.
pub const HERB_SORT_SAFELIST: &[&str] = &[
    "id",
    "name",
    "description",
    "price",
    "-id",
    "-name",
    "-description",
    "-price",
];

/// Columns a list query may be ordered by. Only these static names are ever
/// written into the `ORDER BY` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Id,
    Name,
    Description,
    Price,
}

impl SortColumn {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortColumn::Id => "id",
            SortColumn::Name => "name",
            SortColumn::Description => "description",
            SortColumn::Price => "price",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "id" => Some(SortColumn::Id),
            "name" => Some(SortColumn::Name),
            "description" => Some(SortColumn::Description),
            "price" => Some(SortColumn::Price),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl SortKey {
    /// Parses `name` / `-name`. Returns `None` for anything outside [`SortColumn`].
    pub fn parse(token: &str) -> Option<Self> {
        let (name, direction) = match token.strip_prefix('-') {
            Some(rest) => (rest, SortDirection::Desc),
            None => (token, SortDirection::Asc),
        };
        SortColumn::from_name(name).map(|column| SortKey { column, direction })
    }
}

/// Raw paging parameters as supplied by a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filters {
    pub page: i64,
    pub page_size: i64,
    pub sort: String,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            sort: DEFAULT_SORT.to_string(),
        }
    }
}

impl Filters {
    /// Records every rule violation into `v` and returns the usable descriptor only
    /// when all rules hold.
    pub fn validate<C: Checker>(&self, safelist: &[&str], v: &mut C) -> Option<PageRequest> {
        v.check(self.page > 0, "page", "must be greater than zero");
        v.check(self.page <= MAX_PAGE, "page", "must be a maximum of 10 million");
        v.check(self.page_size > 0, "page_size", "must be greater than zero");
        v.check(
            self.page_size <= MAX_PAGE_SIZE,
            "page_size",
            "must be a maximum of 100",
        );

        let sort = if permitted_value(self.sort.as_str(), safelist) {
            SortKey::parse(&self.sort)
        } else {
            None
        };
        v.check(sort.is_some(), "sort", "invalid sort value");

        match sort {
            Some(sort) if v.valid() => Some(PageRequest {
                page: self.page,
                page_size: self.page_size,
                sort,
            }),
            _ => None,
        }
    }
}

/// A validated paging descriptor. Only [`Filters::validate`] builds one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    page_size: i64,
    sort: SortKey,
}

impl PageRequest {
    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    pub fn sort(&self) -> SortKey {
        self.sort
    }

    pub fn sort_column(&self) -> &'static str {
        self.sort.column.as_sql()
    }

    pub fn sort_direction(&self) -> &'static str {
        self.sort.direction.as_sql()
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct Metadata {
    pub current_page: i64,
    pub page_size: i64,
    pub first_page: i64,
    pub last_page: i64,
    pub total_records: i64,
}

impl Metadata {
    /// All fields are zero when `total_records` is zero.
    pub fn calculate(total_records: i64, page: i64, page_size: i64) -> Self {
        if total_records <= 0 || page_size <= 0 {
            return Metadata::default();
        }
        Metadata {
            current_page: page,
            page_size,
            first_page: 1,
            last_page: (total_records + page_size - 1) / page_size,
            total_records,
        }
    }

    pub fn for_page(total_records: i64, page: &PageRequest) -> Self {
        Self::calculate(total_records, page.page(), page.page_size())
    }
}
