//! In-process `herbs` table with the same row semantics as the PostgreSQL store.
//!
//! Each operation runs inside one mutex critical section with no await point, so
//! it is all-or-nothing just like a single SQL statement.

use super::{HerbPage, HerbQuery, HerbStore};
use crate::domain::filters::{PageRequest, SortColumn, SortDirection};
use crate::domain::herb::{Herb, NewHerb};
use crate::error::StoreError;
use async_trait::async_trait;
use chrono::Utc;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

#[derive(Default)]
struct Table {
    next_id: i64,
    rows: BTreeMap<i64, Herb>,
}

#[derive(Default)]
pub struct MemoryHerbStore {
    table: Mutex<Table>,
}

impl MemoryHerbStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.table.lock().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Lower-cased alphanumeric words, the way the `simple` text-search config splits text.
fn lexemes(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}

/// An empty name matches everything. A non-empty name with no words in it matches
/// nothing, as `plainto_tsquery` yields an empty query that `@@` never satisfies.
fn matches(herb: &Herb, query: &HerbQuery, words: &[String]) -> bool {
    if !query.name.is_empty() {
        let name_words = lexemes(&herb.name);
        if words.is_empty() || !words.iter().all(|w| name_words.contains(w)) {
            return false;
        }
    }
    query
        .culinary_uses
        .iter()
        .all(|tag| herb.culinary_uses.contains(tag))
}

/// Case-folded first, then byte order, approximating a linguistic collation.
fn collate(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn compare(a: &Herb, b: &Herb, page: &PageRequest) -> Ordering {
    let sort = page.sort();
    let primary = match sort.column {
        SortColumn::Id => a.id.cmp(&b.id),
        SortColumn::Name => collate(&a.name, &b.name),
        SortColumn::Description => collate(&a.description, &b.description),
        SortColumn::Price => a.price.cmp(&b.price),
    };
    let primary = match sort.direction {
        SortDirection::Asc => primary,
        SortDirection::Desc => primary.reverse(),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

#[async_trait]
impl HerbStore for MemoryHerbStore {
    async fn insert(&self, herb: &NewHerb) -> Result<Herb, StoreError> {
        let mut table = self.table.lock().await;
        table.next_id += 1;
        let row = Herb {
            id: table.next_id,
            created_at: Utc::now(),
            name: herb.name.clone(),
            description: herb.description.clone(),
            price: herb.price,
            culinary_uses: herb.culinary_uses.clone(),
            version: 1,
        };
        table.rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get(&self, id: i64) -> Result<Option<Herb>, StoreError> {
        Ok(self.table.lock().await.rows.get(&id).cloned())
    }

    async fn update(&self, herb: &Herb) -> Result<Option<i32>, StoreError> {
        let mut table = self.table.lock().await;
        match table.rows.get_mut(&herb.id) {
            Some(row) if row.version == herb.version => {
                row.name = herb.name.clone();
                row.description = herb.description.clone();
                row.price = herb.price;
                row.culinary_uses = herb.culinary_uses.clone();
                row.version += 1;
                Ok(Some(row.version))
            }
            _ => Ok(None),
        }
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.table.lock().await.rows.remove(&id).is_some())
    }

    async fn list(&self, query: &HerbQuery, page: &PageRequest) -> Result<HerbPage, StoreError> {
        let words = lexemes(&query.name);
        let table = self.table.lock().await;

        let mut matched: Vec<&Herb> = table
            .rows
            .values()
            .filter(|h| matches(h, query, &words))
            .collect();
        matched.sort_by(|a, b| compare(a, b, page));

        let total = matched.len() as i64;
        let herbs: Vec<Herb> = matched
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .cloned()
            .collect();

        // The count rides on the returned rows, so a page past the end reports zero.
        let total_records = if herbs.is_empty() { 0 } else { total };

        Ok(HerbPage {
            herbs,
            total_records,
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::filters::{Filters, HERB_SORT_SAFELIST};
    use crate::domain::price::Price;
    use crate::domain::validator::Validator;

    fn new_herb(name: &str, cents: i64, uses: &[&str]) -> NewHerb {
        NewHerb {
            name: name.to_string(),
            description: format!("{} description", name),
            price: Price::from_cents(cents),
            culinary_uses: uses.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn page(page: i64, page_size: i64, sort: &str) -> PageRequest {
        let filters = Filters {
            page,
            page_size,
            sort: sort.to_string(),
        };
        filters
            .validate(HERB_SORT_SAFELIST, &mut Validator::new())
            .unwrap()
    }

    async fn seeded() -> MemoryHerbStore {
        let store = MemoryHerbStore::new();
        store
            .insert(&new_herb("Acacia Powder", 825, &["emulsifier", "thickener"]))
            .await
            .unwrap();
        store
            .insert(&new_herb("Smoked Paprika", 450, &["seasoning", "colouring"]))
            .await
            .unwrap();
        store
            .insert(&new_herb("Sweet Paprika", 450, &["seasoning"]))
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn insert_assigns_id_and_version() {
        let store = MemoryHerbStore::new();
        let a = store.insert(&new_herb("Basil", 100, &["pesto"])).await.unwrap();
        let b = store.insert(&new_herb("Thyme", 100, &["stew"])).await.unwrap();
        assert_eq!((a.id, a.version), (1, 1));
        assert_eq!((b.id, b.version), (2, 1));
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn update_requires_matching_version() {
        let store = MemoryHerbStore::new();
        let mut herb = store.insert(&new_herb("Basil", 100, &["pesto"])).await.unwrap();
        herb.name = "Thai Basil".to_string();
        assert_eq!(store.update(&herb).await.unwrap(), Some(2));
        // Same stale version again.
        assert_eq!(store.update(&herb).await.unwrap(), None);
        assert_eq!(store.get(herb.id).await.unwrap().unwrap().name, "Thai Basil");
    }

    #[tokio::test]
    async fn name_match_is_case_insensitive_and_word_based() {
        let store = seeded().await;
        let found = store
            .list(
                &HerbQuery {
                    name: "PAPRIKA".to_string(),
                    ..HerbQuery::default()
                },
                &page(1, 20, "id"),
            )
            .await
            .unwrap();
        assert_eq!(found.total_records, 2);

        let found = store
            .list(
                &HerbQuery {
                    name: "smoked paprika".to_string(),
                    ..HerbQuery::default()
                },
                &page(1, 20, "id"),
            )
            .await
            .unwrap();
        assert_eq!(found.herbs.len(), 1);
        assert_eq!(found.herbs[0].name, "Smoked Paprika");

        let found = store
            .list(
                &HerbQuery {
                    name: "Papr".to_string(),
                    ..HerbQuery::default()
                },
                &page(1, 20, "id"),
            )
            .await
            .unwrap();
        assert!(found.herbs.is_empty());
    }

    #[tokio::test]
    async fn name_without_words_matches_nothing() {
        let store = seeded().await;
        for name in ["!!!", "-", "  "] {
            let found = store
                .list(
                    &HerbQuery {
                        name: name.to_string(),
                        ..HerbQuery::default()
                    },
                    &page(1, 20, "id"),
                )
                .await
                .unwrap();
            assert!(found.herbs.is_empty(), "name {:?} matched rows", name);
            assert_eq!(found.total_records, 0);
        }

        let everything = store
            .list(&HerbQuery::default(), &page(1, 20, "id"))
            .await
            .unwrap();
        assert_eq!(everything.total_records, 3);
    }

    #[tokio::test]
    async fn name_sort_ignores_case() {
        let store = MemoryHerbStore::new();
        for name in ["basil", "Chervil", "Anise", "anise"] {
            store.insert(&new_herb(name, 100, &["garnish"])).await.unwrap();
        }
        let found = store
            .list(&HerbQuery::default(), &page(1, 20, "name"))
            .await
            .unwrap();
        let names: Vec<&str> = found.herbs.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["Anise", "anise", "basil", "Chervil"]);

        let found = store
            .list(&HerbQuery::default(), &page(1, 20, "-name"))
            .await
            .unwrap();
        let names: Vec<&str> = found.herbs.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["Chervil", "basil", "anise", "Anise"]);
    }

    #[tokio::test]
    async fn tag_filter_requires_superset() {
        let store = seeded().await;
        let query = HerbQuery {
            culinary_uses: vec!["seasoning".to_string(), "colouring".to_string()],
            ..HerbQuery::default()
        };
        let found = store.list(&query, &page(1, 20, "id")).await.unwrap();
        assert_eq!(found.herbs.len(), 1);
        assert_eq!(found.herbs[0].name, "Smoked Paprika");
    }

    #[tokio::test]
    async fn equal_sort_keys_fall_back_to_id() {
        let store = seeded().await;
        let found = store
            .list(&HerbQuery::default(), &page(1, 20, "-price"))
            .await
            .unwrap();
        let ids: Vec<i64> = found.herbs.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        let found = store
            .list(&HerbQuery::default(), &page(1, 20, "price"))
            .await
            .unwrap();
        let ids: Vec<i64> = found.herbs.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[tokio::test]
    async fn total_counts_rows_before_paging() {
        let store = seeded().await;
        let found = store
            .list(&HerbQuery::default(), &page(2, 2, "id"))
            .await
            .unwrap();
        assert_eq!(found.total_records, 3);
        assert_eq!(found.herbs.len(), 1);
        assert_eq!(found.herbs[0].id, 3);

        let past_end = store
            .list(&HerbQuery::default(), &page(5, 2, "id"))
            .await
            .unwrap();
        assert!(past_end.herbs.is_empty());
        assert_eq!(past_end.total_records, 0);
    }
}
