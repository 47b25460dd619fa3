//! In-memory document store for handler tests.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use serde_json::Value;

use super::{DocumentStore, Query, StoreError};
use crate::catalog::{compare_dates_desc, title_key};
use crate::models::product::{Collection, ProductRecord, DATE};
use crate::models::summary::TitleStats;

#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<Mutex<HashMap<Collection, Vec<ProductRecord>>>>,
    failing: Option<Collection>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, collection: Collection, docs: Vec<Value>) -> Self {
        {
            let mut collections = self.collections.lock().unwrap();
            let entry = collections.entry(collection).or_default();
            entry.extend(docs.into_iter().filter_map(ProductRecord::from_value));
        }
        self
    }

    /// Every query against `collection` fails as if the store went away.
    pub fn failing_on(mut self, collection: Collection) -> Self {
        self.failing = Some(collection);
        self
    }

    pub fn documents(&self, collection: Collection) -> Vec<ProductRecord> {
        self.collections
            .lock()
            .unwrap()
            .get(&collection)
            .cloned()
            .unwrap_or_default()
    }

    fn check(&self, collection: Collection) -> Result<(), StoreError> {
        if self.failing == Some(collection) {
            return Err(StoreError::query(collection, sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

fn matches(record: &ProductRecord, query: &Query) -> bool {
    let key = record.title().map(title_key).unwrap_or_default();

    if let Some(title) = &query.title {
        if record.title().is_none() || key != title_key(title) {
            return false;
        }
    }
    if query.exclude_titles.iter().any(|t| title_key(t) == key) {
        return false;
    }
    let url = record.url().unwrap_or_default();
    if query.exclude_urls.iter().any(|u| u == url) {
        return false;
    }
    query.require_fields.iter().all(|f| record.has(f))
}

impl DocumentStore for MemoryStore {
    async fn find(
        &self,
        collection: Collection,
        query: &Query,
    ) -> Result<Vec<ProductRecord>, StoreError> {
        self.check(collection)?;
        let mut found: Vec<ProductRecord> = self
            .documents(collection)
            .into_iter()
            .filter(|r| matches(r, query))
            .collect();

        match query.sort_desc {
            Some(DATE) => found.sort_by(compare_dates_desc),
            Some(field) => found.sort_by(|a, b| {
                b.number(field)
                    .partial_cmp(&a.number(field))
                    .unwrap_or(Ordering::Equal)
            }),
            None => {}
        }
        Ok(found)
    }

    async fn title_stats(&self, collection: Collection) -> Result<Vec<TitleStats>, StoreError> {
        self.check(collection)?;
        let mut groups: BTreeMap<String, TitleStats> = BTreeMap::new();
        for record in self.documents(collection) {
            let Some(title) = record.title() else { continue };
            let key = title_key(title);
            let stats = groups.entry(key.clone()).or_insert(TitleStats {
                title_key: key,
                lowest_price: None,
                total_price: 0.0,
                count: 0,
            });
            stats.count += 1;
            if let Some(price) = record.price_per_100g() {
                stats.total_price += price;
                stats.lowest_price = Some(stats.lowest_price.map_or(price, |low| low.min(price)));
            }
        }
        Ok(groups.into_values().collect())
    }

    async fn has_field(
        &self,
        collection: Collection,
        field: &'static str,
    ) -> Result<bool, StoreError> {
        self.check(collection)?;
        Ok(self
            .documents(collection)
            .iter()
            .any(|r| r.get(field).is_some()))
    }

    async fn write_title_stats(
        &self,
        collection: Collection,
        stats: &[TitleStats],
    ) -> Result<u64, StoreError> {
        self.check(collection)?;
        let mut collections = self.collections.lock().unwrap();
        let Some(docs) = collections.get_mut(&collection) else {
            return Ok(0);
        };

        let mut touched = 0;
        for doc in docs.iter_mut() {
            let Some(key) = doc.title().map(title_key) else { continue };
            if let Some(stat) = stats.iter().find(|s| s.title_key == key) {
                doc.insert("lowestPricePer100g", stat.lowest_price);
                doc.insert("averagePricePer100g", stat.average_price());
                touched += 1;
            }
        }
        Ok(touched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::product::PRICE_PER_100G;
    use serde_json::json;

    #[tokio::test]
    async fn numeric_sort_reads_string_prices() {
        let store = MemoryStore::new().with(
            Collection::Produce,
            vec![
                json!({"title": "a", "pricePer100g": 2.0}),
                json!({"title": "b", "pricePer100g": "3.5"}),
                json!({"title": "c"}),
                json!({"title": "d", "pricePer100g": 0.5}),
            ],
        );

        let found = store
            .find(Collection::Produce, &Query::all().sorted_desc(PRICE_PER_100G))
            .await
            .unwrap();
        let titles: Vec<&str> = found.iter().filter_map(ProductRecord::title).collect();

        assert_eq!(titles, vec!["b", "a", "d", "c"]);
    }
}
