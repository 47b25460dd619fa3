// src/main.rs
use axum::{routing::get, Router};
use foodbasket_backend::{config::Config, database, routes, server, state::AppState, store::PgStore};
use tracing_subscriber::fmt::init as tracing_init;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use dotenvy::dotenv;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_init();

    // Load environment variables
    dotenv().ok();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error=%e, "Invalid configuration");
            return;
        }
    };

    // Open the store handle once; every request reuses it
    let db_pool = match database::create_pool(&config.database_url, config.max_connections).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error=%e, "Failed to create database pool");
            return;
        }
    };

    let app_state = AppState::new(PgStore::new(db_pool), config.exclusions);

    let app: Router = routes::create_router()
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let listener = match server::bind_with_fallback(config.host, config.port).await {
        Ok((listener, addr)) => {
            tracing::info!("Server is running on {}", addr);
            listener
        }
        Err(e) => {
            tracing::error!(error=%e, "Failed to bind to any port starting at {} on {}", config.port, config.host);
            return;
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error=%e, "Server error");
    }
}

async fn health_check() -> &'static str {
    "OK"
}
