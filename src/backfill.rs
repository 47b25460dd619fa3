//! Offline summary backfill.
//!
//! Computes every title's lowest and average `pricePer100g` per collection
//! and writes them onto the stored documents, the same values the details
//! endpoint derives per request. This mutates the store, so it lives
//! outside the request path.

use tracing::info;

use crate::models::product::Collection;
use crate::store::{DocumentStore, StoreError};

/// Returns the number of documents updated across all collections.
pub async fn run<S: DocumentStore>(store: &S) -> Result<u64, StoreError> {
    let mut total = 0;
    for collection in Collection::ALL {
        let stats = store.title_stats(collection).await?;
        let touched = store.write_title_stats(collection, &stats).await?;
        info!(collection = collection.name(), titles = stats.len(), touched, "Updated price summaries");
        total += touched;
    }
    Ok(total)
}
