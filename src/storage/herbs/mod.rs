//! Backing stores for the `herbs` table.

pub mod memory;
pub mod postgres;

pub use memory::MemoryHerbStore;
pub use postgres::PostgresHerbStore;

use crate::domain::filters::PageRequest;
use crate::domain::herb::{Herb, NewHerb};
use crate::error::StoreError;
use async_trait::async_trait;

/// Row filters for a list query. Empty fields match every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HerbQuery {
    /// Full-text match against `name`.
    pub name: String,
    /// Rows must carry every one of these culinary uses.
    pub culinary_uses: Vec<String>,
}

/// One matching page plus the number of rows that matched before paging.
#[derive(Debug, Clone, Default)]
pub struct HerbPage {
    pub herbs: Vec<Herb>,
    pub total_records: i64,
}

/// Single-round-trip operations over the `herbs` table.
///
/// Implementations report raw outcomes (`None`, `false`); mapping those to
/// `NotFound`/`EditConflict` is left to `CatalogService`.
#[async_trait]
pub trait HerbStore: Send + Sync {
    /// Inserts a row and returns it with `id`, `created_at` and `version = 1` filled in.
    async fn insert(&self, herb: &NewHerb) -> Result<Herb, StoreError>;

    async fn get(&self, id: i64) -> Result<Option<Herb>, StoreError>;

    /// Writes every mutable field and bumps the version, only if the stored
    /// version still equals `herb.version`. Returns the new version, or `None`
    /// when no row matched both id and version.
    async fn update(&self, herb: &Herb) -> Result<Option<i32>, StoreError>;

    /// Returns whether a row was removed.
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;

    async fn list(&self, query: &HerbQuery, page: &PageRequest) -> Result<HerbPage, StoreError>;

    /// Cheap reachability probe for the healthcheck.
    async fn ping(&self) -> Result<(), StoreError>;
}
