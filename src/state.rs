// src/state.rs
use std::sync::Arc;

use crate::config::ExclusionList;
use crate::store::DocumentStore;

/// Shared per-process state: the store handle opened at startup and the
/// exclusion list read from config.
#[derive(Clone)]
pub struct AppState<S> {
    pub store: S,
    pub exclusions: Arc<ExclusionList>,
}

impl<S: DocumentStore> AppState<S> {
    pub fn new(store: S, exclusions: ExclusionList) -> Self {
        Self {
            store,
            exclusions: Arc::new(exclusions),
        }
    }
}
