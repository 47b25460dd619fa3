//! PostgreSQL-backed document store.
//!
//! Each collection is a table named after it, holding the scraped document
//! verbatim:
//!
//! ```sql
//! CREATE TABLE meatdepartments (
//!     id  BIGSERIAL PRIMARY KEY,
//!     doc JSONB NOT NULL
//! );
//! ```
//!
//! Table names only ever come from [`Collection::name`], so they are safe to
//! splice into SQL. Everything user-supplied goes through bind parameters.

use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, instrument};

use super::{DocumentStore, Query, StoreError};
use crate::models::product::{Collection, ProductRecord};
use crate::models::summary::TitleStats;

// pricePer100g as float8, accepting numeric strings; NULL when unusable.
const PRICE_PER_100G_EXPR: &str = r#"CASE
    WHEN jsonb_typeof(doc->'pricePer100g') = 'number' THEN (doc->>'pricePer100g')::FLOAT8
    WHEN jsonb_typeof(doc->'pricePer100g') = 'string'
         AND btrim(doc->>'pricePer100g') ~ '^-?[0-9]+(\.[0-9]+)?$'
        THEN btrim(doc->>'pricePer100g')::FLOAT8
END"#;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn build_find(collection: Collection, query: &Query) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT doc FROM ");
    qb.push(collection.name()).push(" WHERE TRUE");

    if let Some(title) = &query.title {
        qb.push(" AND lower(doc->>'title') = lower(")
            .push_bind(title.clone())
            .push(")");
    }

    if !query.exclude_titles.is_empty() {
        let lowered: Vec<String> = query
            .exclude_titles
            .iter()
            .map(|t| t.to_lowercase())
            .collect();
        qb.push(" AND lower(coalesce(doc->>'title', '')) <> ALL(")
            .push_bind(lowered)
            .push(")");
    }

    if !query.exclude_urls.is_empty() {
        qb.push(" AND coalesce(doc->>'url', '') <> ALL(")
            .push_bind(query.exclude_urls.clone())
            .push(")");
    }

    for field in &query.require_fields {
        qb.push(" AND coalesce(jsonb_typeof(doc -> ")
            .push_bind(*field)
            .push("), 'null') <> 'null'");
    }

    match query.sort_desc {
        Some(field) => {
            qb.push(" ORDER BY doc -> ")
                .push_bind(field)
                .push(" DESC NULLS LAST, id");
        }
        None => {
            qb.push(" ORDER BY id");
        }
    }

    qb
}

impl DocumentStore for PgStore {
    #[instrument(skip_all, fields(collection = collection.name()))]
    async fn find(
        &self,
        collection: Collection,
        query: &Query,
    ) -> Result<Vec<ProductRecord>, StoreError> {
        let mut qb = build_find(collection, query);
        let rows = qb
            .build_query_scalar::<Json<ProductRecord>>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::query(collection, e))?;

        debug!(count = rows.len(), "fetched documents");
        Ok(rows.into_iter().map(|Json(record)| record).collect())
    }

    #[instrument(skip_all, fields(collection = collection.name()))]
    async fn title_stats(&self, collection: Collection) -> Result<Vec<TitleStats>, StoreError> {
        let sql = format!(
            "SELECT lower(doc->>'title') AS title_key,
                    MIN(price) AS lowest_price,
                    COALESCE(SUM(price), 0)::FLOAT8 AS total_price,
                    COUNT(*) AS count
             FROM (SELECT doc, {PRICE_PER_100G_EXPR} AS price FROM {table}) priced
             WHERE doc->>'title' IS NOT NULL
             GROUP BY lower(doc->>'title')",
            table = collection.name(),
        );

        sqlx::query_as::<_, TitleStats>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::query(collection, e))
    }

    async fn has_field(
        &self,
        collection: Collection,
        field: &'static str,
    ) -> Result<bool, StoreError> {
        let sql = format!(
            "SELECT EXISTS (SELECT 1 FROM {} WHERE doc ? $1)",
            collection.name()
        );

        sqlx::query_scalar::<_, bool>(&sql)
            .bind(field)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::query(collection, e))
    }

    #[instrument(skip_all, fields(collection = collection.name(), titles = stats.len()))]
    async fn write_title_stats(
        &self,
        collection: Collection,
        stats: &[TitleStats],
    ) -> Result<u64, StoreError> {
        let sql = format!(
            "UPDATE {} SET doc = doc || jsonb_build_object(
                 'lowestPricePer100g', $2::FLOAT8,
                 'averagePricePer100g', $3::FLOAT8)
             WHERE lower(doc->>'title') = $1",
            collection.name()
        );

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::query(collection, e))?;

        let mut touched = 0;
        for stat in stats {
            let result = sqlx::query(&sql)
                .bind(&stat.title_key)
                .bind(stat.lowest_price)
                .bind(stat.average_price())
                .execute(&mut *tx)
                .await
                .map_err(|e| StoreError::query(collection, e))?;
            touched += result.rows_affected();
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::query(collection, e))?;

        Ok(touched)
    }
}
