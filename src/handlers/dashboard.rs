// src/handlers/dashboard.rs
use axum::{
    extract::{Path, State},
    Json,
};
use tracing::instrument;

use crate::catalog::{self, DASHBOARD_FIELDS};
use crate::error::AppError;
use crate::models::product::{ProductRecord, DATE};
use crate::state::AppState;
use crate::store::{find_in_all, DocumentStore, Query};

/// Path segment reserved for the full listing.
const ALL: &str = "all";

// GET /dashboard/all - Every complete record, newest first
#[instrument(skip(state))]
pub async fn list_all<S: DocumentStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<ProductRecord>>, AppError> {
    let mut documents = find_in_all(&state.store, |_| {
        Query::all().requiring(&DASHBOARD_FIELDS).sorted_desc(DATE)
    })
    .await?;

    documents.retain(catalog::is_dashboard_valid);
    catalog::sort_by_date_desc(&mut documents);
    Ok(Json(documents))
}

// GET /dashboard/{title} - Full observation history of one product, newest first
#[instrument(skip(state))]
pub async fn get_history<S: DocumentStore>(
    Path(title): Path<String>,
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<ProductRecord>>, AppError> {
    if catalog::title_key(&title) == ALL {
        return Err(AppError::not_found("Endpoint not found"));
    }

    let mut documents = find_in_all(&state.store, |_| Query::titled(&title).sorted_desc(DATE)).await?;
    catalog::sort_by_date_desc(&mut documents);
    Ok(Json(documents))
}
