// src/error.rs
use axum::{response::{IntoResponse, Response}, Json};
use http::StatusCode;
use serde_json::json;
use tracing::error;

use crate::store::StoreError;

#[derive(Debug)]
pub enum AppError {
    StoreError(StoreError),
    NotFound(String),
}

impl AppError {
    pub fn not_found(msg: &str) -> Self {
        AppError::NotFound(msg.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": msg }))).into_response()
            }
            AppError::StoreError(e) => {
                error!(error = %e, "Error querying collections");
                internal_server_error()
            }
        }
    }
}

// Failures never leak detail to the caller.
fn internal_server_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::StoreError(err)
    }
}
