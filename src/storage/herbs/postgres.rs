//! `herbs` table stored in PostgreSQL.

use super::{HerbPage, HerbQuery, HerbStore};
use crate::domain::filters::PageRequest;
use crate::domain::herb::{Herb, NewHerb};
use crate::domain::price::Price;
use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;
use tracing::info;

const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS herbs (
    id bigserial PRIMARY KEY,
    created_at timestamp(0) with time zone NOT NULL DEFAULT NOW(),
    name text NOT NULL,
    description text NOT NULL,
    price numeric(12, 2) NOT NULL,
    culinary_uses text[] NOT NULL,
    version integer NOT NULL DEFAULT 1,
    CONSTRAINT herbs_price_check CHECK (price > 0),
    CONSTRAINT herbs_culinary_uses_length_check
        CHECK (array_length(culinary_uses, 1) BETWEEN 1 AND 5)
)";

const CREATE_INDEX_SQL: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS herbs_name_idx ON herbs USING GIN (to_tsvector('simple', name))",
    "CREATE INDEX IF NOT EXISTS herbs_culinary_uses_idx ON herbs USING GIN (culinary_uses)",
];

// Prices travel as integer cents; the column keeps them as NUMERIC(12, 2).
const SELECT_COLUMNS: &str = "id, created_at, name, description, \
     round(price * 100)::int8 AS price_cents, culinary_uses, version";

/// Connection settings for [`PostgresHerbStore::connect`].
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub idle_timeout: Duration,
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 25,
            idle_timeout: Duration::from_secs(15 * 60),
            acquire_timeout: Duration::from_secs(3),
        }
    }
}

#[derive(Clone)]
pub struct PostgresHerbStore {
    pool: PgPool,
}

impl PostgresHerbStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool against `database_url` and makes sure the table and its indexes exist.
    pub async fn connect(database_url: &str, settings: &PoolSettings) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .idle_timeout(settings.idle_timeout)
            .acquire_timeout(settings.acquire_timeout)
            .connect(database_url)
            .await?;

        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    pub async fn ensure_schema(&self) -> anyhow::Result<()> {
        sqlx::query(CREATE_TABLE_SQL).execute(&self.pool).await?;
        for sql in CREATE_INDEX_SQL {
            sqlx::query(*sql).execute(&self.pool).await?;
        }
        info!("herbs table ready");
        Ok(())
    }
}

fn herb_from_row(row: &PgRow) -> Result<Herb, sqlx::Error> {
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    let price_cents: i64 = row.try_get("price_cents")?;
    Ok(Herb {
        id: row.try_get("id")?,
        created_at,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        price: Price::from_cents(price_cents),
        culinary_uses: row.try_get("culinary_uses")?,
        version: row.try_get("version")?,
    })
}

#[async_trait]
impl HerbStore for PostgresHerbStore {
    async fn insert(&self, herb: &NewHerb) -> Result<Herb, StoreError> {
        let row = sqlx::query(
            "INSERT INTO herbs (name, description, price, culinary_uses)
             VALUES ($1, $2, $3::int8 / 100.0, $4)
             RETURNING id, created_at, version",
        )
        .bind(&herb.name)
        .bind(&herb.description)
        .bind(herb.price.cents())
        .bind(&herb.culinary_uses)
        .fetch_one(&self.pool)
        .await?;

        Ok(Herb {
            id: row.try_get("id")?,
            created_at: row.try_get("created_at")?,
            name: herb.name.clone(),
            description: herb.description.clone(),
            price: herb.price,
            culinary_uses: herb.culinary_uses.clone(),
            version: row.try_get("version")?,
        })
    }

    async fn get(&self, id: i64) -> Result<Option<Herb>, StoreError> {
        let sql = format!("SELECT {} FROM herbs WHERE id = $1", SELECT_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(herb_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn update(&self, herb: &Herb) -> Result<Option<i32>, StoreError> {
        // Compare-and-swap on version in a single statement.
        let version: Option<i32> = sqlx::query_scalar(
            "UPDATE herbs
             SET name = $1, description = $2, price = $3::int8 / 100.0, culinary_uses = $4,
                 version = version + 1
             WHERE id = $5 AND version = $6
             RETURNING version",
        )
        .bind(&herb.name)
        .bind(&herb.description)
        .bind(herb.price.cents())
        .bind(&herb.culinary_uses)
        .bind(herb.id)
        .bind(herb.version)
        .fetch_optional(&self.pool)
        .await?;

        Ok(version)
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM herbs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, query: &HerbQuery, page: &PageRequest) -> Result<HerbPage, StoreError> {
        // Column and direction come from closed enums, never from client text.
        let sql = format!(
            "SELECT count(*) OVER() AS total_records, {}
             FROM herbs
             WHERE (to_tsvector('simple', name) @@ plainto_tsquery('simple', $1) OR $1 = '')
             AND (culinary_uses @> $2 OR $2 = '{{}}')
             ORDER BY {} {}, id ASC
             LIMIT $3 OFFSET $4",
            SELECT_COLUMNS,
            page.sort_column(),
            page.sort_direction()
        );

        let rows = sqlx::query(&sql)
            .bind(&query.name)
            .bind(&query.culinary_uses)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let mut total_records: i64 = 0;
        let mut herbs = Vec::with_capacity(rows.len());
        for row in &rows {
            total_records = row.try_get("total_records")?;
            herbs.push(herb_from_row(row)?);
        }

        Ok(HerbPage {
            herbs,
            total_records,
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
