//! Handle database requests.

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::error::Result;
use crate::record::{Record, RecordFields, RecordId, RecordStore};

/// PostgreSQL-backed [`RecordStore`].
#[derive(Clone)]
pub struct PgRecordStore {
    pool: Pool<Postgres>,
}

impl PgRecordStore {
    /// Create a new [`PgRecordStore`].
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    /// Insert [`RecordFields`] into database and return generated id.
    async fn insert(&self, fields: &RecordFields) -> Result<RecordId> {
        let id = sqlx::query_scalar::<_, RecordId>(
            r#"INSERT INTO users (name, email, password) VALUES ($1, $2, $3) RETURNING id"#,
        )
        .bind(&fields.name)
        .bind(&fields.email)
        .bind(&fields.password)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn list(&self) -> Result<Vec<Record>> {
        let records = sqlx::query_as::<_, Record>(
            r#"SELECT id, name, email, password FROM users ORDER BY id"#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn find_by_id(&self, id: RecordId) -> Result<Option<Record>> {
        let record = sqlx::query_as::<_, Record>(
            r#"SELECT id, name, email, password FROM users WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn update(&self, id: RecordId, fields: &RecordFields) -> Result<bool> {
        let result = sqlx::query(
            r#"UPDATE users SET name = $1, email = $2, password = $3 WHERE id = $4"#,
        )
        .bind(&fields.name)
        .bind(&fields.email)
        .bind(&fields.password)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: RecordId) -> Result<bool> {
        let result = sqlx::query(r#"DELETE FROM users WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
