//! Writes per-title price summaries onto the stored documents. Run it after
//! a scrape; the API never depends on it.

use dotenvy::dotenv;
use foodbasket_backend::{
    config::Config,
    backfill,
    database,
    store::PgStore,
};
use tracing::{error, info};
use tracing_subscriber::fmt::init as tracing_init;

#[tokio::main]
async fn main() {
    tracing_init();
    dotenv().ok();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            std::process::exit(2);
        }
    };

    let store = match database::create_pool(&config.database_url, config.max_connections).await {
        Ok(pool) => PgStore::new(pool),
        Err(e) => {
            error!(error = %e, "Failed to create database pool");
            std::process::exit(1);
        }
    };

    match backfill::run(&store).await {
        Ok(total) => info!(total, "Backfill complete"),
        Err(e) => {
            error!(error = %e, "Backfill aborted");
            std::process::exit(1);
        }
    }
}
