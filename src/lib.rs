pub mod app;
pub mod domain;
pub mod error;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::catalog_service::{CatalogService, HerbList};
pub use domain::filters::{Filters, Metadata, PageRequest, HERB_SORT_SAFELIST};
pub use domain::herb::{Herb, HerbPatch, NewHerb};
pub use domain::price::Price;
pub use error::{CatalogError, StoreError};
pub use storage::herbs::{HerbStore, MemoryHerbStore, PostgresHerbStore};
