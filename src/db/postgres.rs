//! PostgreSQL store - connection pool and schema

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, QueryBuilder};

use super::{StoreResult, ThreatStore};
use crate::models::Threat;
use crate::services::matcher::SearchTerm;

pub struct PgThreatStore {
    pool: PgPool,
}

impl PgThreatStore {
    /// Create the connection pool
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Apply the schema; every statement is idempotent
    pub async fn run_migrations(&self) -> StoreResult<()> {
        sqlx::raw_sql(SCHEMA_SQL).execute(&self.pool).await?;

        tracing::info!("Database schema applied successfully");
        Ok(())
    }
}

#[async_trait]
impl ThreatStore for PgThreatStore {
    async fn insert_many(&self, threats: &[Threat]) -> StoreResult<Vec<Threat>> {
        if threats.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("INSERT INTO threats (name, description, tags, created_at) ");

        builder.push_values(threats, |mut row, threat| {
            row.push_bind(threat.name.clone())
                .push_bind(threat.description.clone())
                .push_bind(threat.tags.clone())
                .push_bind(threat.created_at);
        });
        builder.push(" RETURNING name, description, tags, created_at");

        let inserted = builder
            .build_query_as::<Threat>()
            .fetch_all(&self.pool)
            .await?;

        Ok(inserted)
    }

    // ILIKE folds case by the database collation. Outside ASCII this can
    // disagree with `SearchTerm::matches`, leaving `matchedTag` empty on a hit.
    async fn find_by_tags(&self, terms: &[SearchTerm], limit: i64) -> StoreResult<Vec<Threat>> {
        let patterns: Vec<String> = terms.iter().map(SearchTerm::like_pattern).collect();

        let threats = sqlx::query_as::<_, Threat>(
            r#"
            SELECT name, description, tags, created_at FROM threats
            WHERE EXISTS (
                SELECT 1 FROM unnest(tags) AS tag
                WHERE tag ILIKE ANY($1)
            )
            ORDER BY created_at DESC
            LIMIT $2
            "#
        )
        .bind(patterns)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(threats)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database pool closed");
    }
}

/// Database schema SQL
const SCHEMA_SQL: &str = r#"
-- Threat records (ingested pulses)
CREATE TABLE IF NOT EXISTS threats (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    tags TEXT[] NOT NULL DEFAULT '{}',
    created_at TIMESTAMPTZ NOT NULL,
    ingested_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_threats_created ON threats(created_at DESC);
CREATE INDEX IF NOT EXISTS idx_threats_tags ON threats USING GIN (tags);
"#;
