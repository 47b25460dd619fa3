use axum::{routing::get, Router};
use crate::handlers::dashboard::{get_history, list_all};
use crate::state::AppState;
use crate::store::DocumentStore;

pub fn routes<S: DocumentStore>() -> Router<AppState<S>> {
    // The static segment wins over the capture, so /dashboard/all never
    // reaches get_history.
    Router::new()
        .route("/dashboard/all", get(list_all::<S>))
        .route("/dashboard/{title}", get(get_history::<S>))
}
