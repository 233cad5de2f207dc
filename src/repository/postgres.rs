//! PostgreSQL document store: one JSONB table, containment via `@>`

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, FromRow, Pool, Postgres};
use uuid::Uuid;

use super::{not_found, Document, DocumentStore, Filter};
use crate::{
    config::StorageConfig,
    error::{AppError, AppResult},
    models::EntityKind,
};

#[derive(Debug, FromRow)]
struct DocumentRow {
    id: Uuid,
    body: Value,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Document {
            id: row.id,
            body: row.body,
        }
    }
}

#[derive(Clone)]
pub struct PgDocumentStore {
    pool: Pool<Postgres>,
}

impl PgDocumentStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Open the pool and bring the schema up to date
    pub async fn connect(config: &StorageConfig) -> AppResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect(&config.url)
            .await?;

        tracing::info!("Connected to database");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::StorageFailure(format!("migration failed: {}", e)))?;

        tracing::info!("Database migrations completed");

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn find(
        &self,
        kind: EntityKind,
        filter: &Filter,
        sort: Option<&'static str>,
    ) -> AppResult<Vec<Document>> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, body FROM documents
            WHERE kind = $1 AND body @> $2
            ORDER BY body ->> $3 COLLATE "C", crea_date
            "#,
        )
        .bind(kind.as_str())
        .bind(filter.as_json())
        .bind(sort)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Document::from).collect())
    }

    async fn find_by_ids(&self, kind: EntityKind, ids: &[Uuid]) -> AppResult<Vec<Document>> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            "SELECT id, body FROM documents WHERE kind = $1 AND id = ANY($2)",
        )
        .bind(kind.as_str())
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Document::from).collect())
    }

    async fn find_by_id(&self, kind: EntityKind, id: Uuid) -> AppResult<Option<Document>> {
        let row = sqlx::query_as::<_, DocumentRow>(
            "SELECT id, body FROM documents WHERE kind = $1 AND id = $2",
        )
        .bind(kind.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Document::from))
    }

    async fn count(&self, kind: EntityKind, filter: &Filter) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM documents WHERE kind = $1 AND body @> $2",
        )
        .bind(kind.as_str())
        .bind(filter.as_json())
        .fetch_one(&self.pool)
        .await?;
        Ok(count.max(0) as u64)
    }

    async fn insert(&self, kind: EntityKind, body: Value) -> AppResult<Document> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            INSERT INTO documents (id, kind, body)
            VALUES ($1, $2, $3)
            RETURNING id, body
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(kind.as_str())
        .bind(body)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn update_by_id(&self, kind: EntityKind, id: Uuid, body: Value) -> AppResult<Document> {
        sqlx::query_as::<_, DocumentRow>(
            r#"
            UPDATE documents SET body = $3, modif_date = NOW()
            WHERE kind = $1 AND id = $2
            RETURNING id, body
            "#,
        )
        .bind(kind.as_str())
        .bind(id)
        .bind(body)
        .fetch_optional(&self.pool)
        .await?
        .map(Document::from)
        .ok_or_else(|| not_found(kind, id))
    }

    async fn delete_by_id(&self, kind: EntityKind, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM documents WHERE kind = $1 AND id = $2")
            .bind(kind.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found(kind, id));
        }
        Ok(())
    }
}
