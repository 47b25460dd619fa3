use axum::{routing::get, Router};
use crate::handlers::catalog::{get_details, list_catalog, list_titles, price_history, record_count};
use crate::state::AppState;
use crate::store::DocumentStore;

pub fn routes<S: DocumentStore>() -> Router<AppState<S>> {
    Router::new()
        .route("/", get(list_catalog::<S>))
        .route("/list", get(list_titles::<S>))
        .route("/details/{title}", get(get_details::<S>))
        .route("/record-count", get(record_count::<S>))
        .route("/price/{title}", get(price_history::<S>))
}
