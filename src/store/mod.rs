//! Document store the catalog reads from.
//!
//! Every department is its own logical collection of scraped documents. The
//! catalog only needs three capabilities from the store: filtered and sorted
//! reads, a per-title grouping of `pricePer100g`, and a field-existence probe.
//! The backfill job additionally writes computed summaries back.

use std::future::Future;

use thiserror::Error;

use crate::config::Exclusion;
use crate::models::product::{Collection, ProductRecord};
use crate::models::summary::TitleStats;

pub mod postgres;

#[cfg(test)]
pub mod memory;

pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document store unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),

    #[error("query on {collection} failed: {source}")]
    Query {
        collection: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

impl StoreError {
    pub fn query(collection: Collection, source: sqlx::Error) -> Self {
        StoreError::Query {
            collection: collection.name(),
            source,
        }
    }
}

/// Read filter for one collection. Title comparisons are case-insensitive
/// and literal; nothing here is interpreted as a pattern.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub title: Option<String>,
    pub exclude_titles: Vec<String>,
    pub exclude_urls: Vec<String>,
    pub require_fields: Vec<&'static str>,
    /// Field to order by, largest first.
    pub sort_desc: Option<&'static str>,
}

impl Query {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn titled(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            ..Self::default()
        }
    }

    pub fn excluding(mut self, exclusion: Option<&Exclusion>) -> Self {
        if let Some(exclusion) = exclusion {
            self.exclude_titles.extend(exclusion.titles.iter().cloned());
            self.exclude_urls.extend(exclusion.urls.iter().cloned());
        }
        self
    }

    pub fn requiring(mut self, fields: &[&'static str]) -> Self {
        self.require_fields.extend_from_slice(fields);
        self
    }

    pub fn sorted_desc(mut self, field: &'static str) -> Self {
        self.sort_desc = Some(field);
        self
    }
}

/// Read access to the six department collections.
///
/// Implementations hold a long-lived handle that is cheap to clone and safe
/// to share across requests.
pub trait DocumentStore: Clone + Send + Sync + 'static {
    fn find(
        &self,
        collection: Collection,
        query: &Query,
    ) -> impl Future<Output = Result<Vec<ProductRecord>, StoreError>> + Send;

    fn title_stats(
        &self,
        collection: Collection,
    ) -> impl Future<Output = Result<Vec<TitleStats>, StoreError>> + Send;

    /// Whether any document in the collection carries `field` at all.
    fn has_field(
        &self,
        collection: Collection,
        field: &'static str,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Persists `lowestPricePer100g` and `averagePricePer100g` onto every
    /// document of each title. Returns the number of documents touched.
    fn write_title_stats(
        &self,
        collection: Collection,
        stats: &[TitleStats],
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;
}

/// Runs one query per department, one after another, and concatenates the
/// results in department order. Any failing collection fails the whole read.
pub async fn find_in_all<S, F>(store: &S, query_for: F) -> Result<Vec<ProductRecord>, StoreError>
where
    S: DocumentStore,
    F: Fn(Collection) -> Query + Send,
{
    let mut combined = Vec::new();
    for collection in Collection::ALL {
        let query = query_for(collection);
        combined.extend(store.find(collection, &query).await?);
    }
    Ok(combined)
}
