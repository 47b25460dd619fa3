// src/handlers/catalog.rs
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use tracing::{info, instrument};

use crate::catalog;
use crate::dtos::catalog::{RecordCount, TitleListItem};
use crate::error::AppError;
use crate::models::product::{Collection, ProductRecord, DATE, PRICE_PER_100G};
use crate::state::AppState;
use crate::store::{find_in_all, DocumentStore, Query};

async fn listed_catalog<S: DocumentStore>(state: &AppState<S>) -> Result<Vec<ProductRecord>, AppError> {
    let combined = find_in_all(&state.store, |collection| {
        Query::all().excluding(state.exclusions.for_collection(collection))
    })
    .await?;

    Ok(catalog::sort_and_dedup(combined))
}

// GET / - Every product once, sorted by title
#[instrument(skip(state))]
pub async fn list_catalog<S: DocumentStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<ProductRecord>>, AppError> {
    let products = listed_catalog(&state).await?;
    info!(count = products.len(), "products in the basket");
    Ok(Json(products))
}

// GET /list - Titles for the product picker
#[instrument(skip(state))]
pub async fn list_titles<S: DocumentStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<TitleListItem>>, AppError> {
    let products = listed_catalog(&state).await?;
    Ok(Json(products.into_iter().map(TitleListItem::from).collect()))
}

// GET /details/{title} - One product with its lowest and average unit price
#[instrument(skip(state))]
pub async fn get_details<S: DocumentStore>(
    Path(title): Path<String>,
    State(state): State<AppState<S>>,
) -> Result<Json<ProductRecord>, AppError> {
    let by_unit_price = Query::all().sorted_desc(PRICE_PER_100G);
    let mut combined = Vec::new();

    for collection in Collection::ALL {
        let stats = state.store.title_stats(collection).await?;
        let mut documents = state.store.find(collection, &by_unit_price).await?;
        catalog::attach_price_stats(&mut documents, &stats);
        combined.extend(documents);
    }

    let product = catalog::find_by_title(catalog::sort_and_dedup(combined), &title)
        .ok_or_else(|| AppError::not_found("Document not found"))?;

    Ok(Json(product))
}

// GET /record-count - How many records we hold and how stale the oldest is
#[instrument(skip(state))]
pub async fn record_count<S: DocumentStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<RecordCount>, AppError> {
    let mut combined = Vec::new();

    for collection in Collection::ALL {
        if !state.store.has_field(collection, DATE).await? {
            continue;
        }
        combined.extend(state.store.find(collection, &Query::all()).await?);
    }

    Ok(Json(RecordCount::new(&combined, Utc::now())))
}

// GET /price/{title} - Monthly average unit price for one product
#[instrument(skip(state))]
pub async fn price_history<S: DocumentStore>(
    Path(title): Path<String>,
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<ProductRecord>>, AppError> {
    let observations = find_in_all(&state.store, |_| Query::titled(&title)).await?;
    Ok(Json(catalog::price_history(observations)))
}
