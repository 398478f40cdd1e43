//! The catalog engine.
//!
//! Sits between the HTTP layer and a [`HerbStore`]. It is responsible for:
//! 1.  Rejecting impossible ids before any store call.
//! 2.  Running field validation before any write reaches the store.
//! 3.  Bounding every store call with a timeout.
//! 4.  Turning raw store outcomes into `NotFound` / `EditConflict`.

use crate::domain::filters::{Filters, Metadata, HERB_SORT_SAFELIST};
use crate::domain::herb::{validate_herb, Herb, HerbPatch, NewHerb};
use crate::domain::validator::{Checker, Validator};
use crate::error::{CatalogError, Result, StoreError};
use crate::storage::herbs::{HerbQuery, HerbStore};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(3);

/// One page of herbs plus its paging metadata.
#[derive(Debug, Clone)]
pub struct HerbList {
    pub herbs: Vec<Herb>,
    pub metadata: Metadata,
}

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn HerbStore>,
    timeout: Duration,
}

impl CatalogService {
    pub fn new(store: Arc<dyn HerbStore>) -> Self {
        Self::with_timeout(store, DEFAULT_STORE_TIMEOUT)
    }

    pub fn with_timeout(store: Arc<dyn HerbStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    async fn bounded<T, F>(&self, call: F) -> std::result::Result<T, StoreError>
    where
        F: Future<Output = std::result::Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(timeout = ?self.timeout, "store call timed out");
                Err(StoreError::Timeout(self.timeout))
            }
        }
    }

    /// Validates and stores a new herb. Returns it with id, created_at and version set.
    pub async fn insert(&self, herb: NewHerb) -> Result<Herb> {
        let mut v = Validator::new();
        validate_herb(&mut v, &herb);
        v.finish().map_err(CatalogError::ValidationFailed)?;

        let created = self.bounded(self.store.insert(&herb)).await?;
        info!(id = created.id, name = %created.name, "herb created");
        Ok(created)
    }

    pub async fn get(&self, id: i64) -> Result<Herb> {
        if id < 1 {
            return Err(CatalogError::NotFound);
        }
        self.bounded(self.store.get(id))
            .await?
            .ok_or(CatalogError::NotFound)
    }

    /// Writes `herb` if its `version` is still the stored one, then refreshes
    /// `herb.version` to the new value. A stale version yields `EditConflict`.
    pub async fn update(&self, herb: &mut Herb) -> Result<()> {
        let mut v = Validator::new();
        validate_herb(&mut v, &*herb);
        v.finish().map_err(CatalogError::ValidationFailed)?;

        match self.bounded(self.store.update(herb)).await? {
            Some(version) => {
                info!(id = herb.id, from = herb.version, to = version, "herb updated");
                herb.version = version;
                Ok(())
            }
            None => {
                debug!(id = herb.id, version = herb.version, "stale version on update");
                Err(CatalogError::EditConflict)
            }
        }
    }

    /// Reads the herb, merges `patch` into it and writes it back under the read version.
    pub async fn patch(&self, id: i64, patch: HerbPatch) -> Result<Herb> {
        let herb = self.get(id).await?;
        self.apply_patch(herb, patch).await
    }

    /// Merges `patch` into a herb previously returned by [`get`](Self::get) and
    /// writes it back under that herb's version.
    pub async fn apply_patch(&self, mut herb: Herb, patch: HerbPatch) -> Result<Herb> {
        patch.apply_to(&mut herb);
        self.update(&mut herb).await?;
        Ok(herb)
    }

    /// Deleting an id that has no row is `NotFound`, including a second delete.
    pub async fn delete(&self, id: i64) -> Result<()> {
        if id < 1 {
            return Err(CatalogError::NotFound);
        }
        if self.bounded(self.store.delete(id)).await? {
            info!(id, "herb deleted");
            Ok(())
        } else {
            Err(CatalogError::NotFound)
        }
    }

    /// Validates `filters` against the herb sort safelist and returns the matching page.
    pub async fn list(
        &self,
        name: &str,
        culinary_uses: &[String],
        filters: &Filters,
    ) -> Result<HerbList> {
        let mut v = Validator::new();
        self.list_with(name, culinary_uses, filters, &mut v).await
    }

    /// Like [`list`](Self::list), but adds its findings to a validator that may
    /// already hold errors (e.g. unparsable query parameters).
    pub async fn list_with(
        &self,
        name: &str,
        culinary_uses: &[String],
        filters: &Filters,
        v: &mut Validator,
    ) -> Result<HerbList> {
        let page = filters.validate(HERB_SORT_SAFELIST, v);
        let page = match page {
            Some(page) if v.valid() => page,
            _ => {
                return Err(CatalogError::ValidationFailed(
                    std::mem::take(v).into_errors(),
                ))
            }
        };

        let query = HerbQuery {
            name: name.to_string(),
            culinary_uses: culinary_uses.to_vec(),
        };
        let found = self.bounded(self.store.list(&query, &page)).await?;
        Ok(HerbList {
            metadata: Metadata::for_page(found.total_records, &page),
            herbs: found.herbs,
        })
    }

    pub async fn ping(&self) -> Result<()> {
        Ok(self.bounded(self.store.ping()).await?)
    }
}
