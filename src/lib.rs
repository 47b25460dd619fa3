//! Read-only price-comparison API over scraped grocery department data.
//!
//! Six department collections (meat, bakery, produce, canned-and-dry, frozen,
//! refrigerated) are merged per request and served as JSON: a deduplicated
//! catalog, per-product price summaries and monthly history, and dashboard
//! listings. The merge, dedup and averaging logic lives in [`catalog`]; the
//! store behind it is abstracted by [`store::DocumentStore`].

pub mod backfill;
pub mod catalog;
pub mod config;
pub mod database;
pub mod dtos;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod server;
pub mod state;
pub mod store;
