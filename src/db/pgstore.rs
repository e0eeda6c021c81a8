use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::info;

use super::store::{DocStore, StoreError, StoredDocument};

/// PostgreSQL-backed document store
pub struct PgDocStore {
    pool: PgPool,
}

impl PgDocStore {
    /// Create a new database connection pool and ensure the schema exists
    ///
    /// # Arguments
    /// * `database_url` - PostgreSQL connection string
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        info!("Connecting to database...");

        let pool = PgPoolOptions::new()
            .max_connections(20) // Support concurrent load/save across rooms
            .min_connections(2) // Keep some connections alive
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600)) // Close idle connections after 10 minutes
            .max_lifetime(Duration::from_secs(1800)) // Recycle connections after 30 minutes
            .connect(database_url)
            .await?;

        info!("Database connection pool created successfully");

        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                content TEXT NOT NULL DEFAULT '',
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl DocStore for PgDocStore {
    async fn get(&self, document_id: &str) -> Result<Option<StoredDocument>, StoreError> {
        let document = sqlx::query_as::<_, StoredDocument>(
            "SELECT id, content, created_at, updated_at FROM documents WHERE id = $1",
        )
        .bind(document_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(document)
    }

    async fn upsert(&self, document_id: &str, content: &str) -> Result<StoredDocument, StoreError> {
        let document = sqlx::query_as::<_, StoredDocument>(
            r#"
            INSERT INTO documents (id, content)
            VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE
                SET content = EXCLUDED.content, updated_at = now()
            RETURNING id, content, created_at, updated_at
            "#,
        )
        .bind(document_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(document)
    }
}
