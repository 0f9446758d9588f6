use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;

use crate::repository::{DocumentStore, Namespace, StorageError};

use super::SqliteRepository;

#[async_trait]
impl DocumentStore for SqliteRepository {
    async fn load_document(&self, namespace: Namespace) -> Result<Option<String>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT body
            FROM documents
            WHERE namespace = ?1
            ",
        )
        .bind(namespace.key())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let body: String = row
            .try_get("body")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        Ok(Some(body))
    }

    async fn save_document(&self, namespace: Namespace, body: &str) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO documents (namespace, body, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(namespace) DO UPDATE SET
                body = excluded.body,
                updated_at = excluded.updated_at
            ",
        )
        .bind(namespace.key())
        .bind(body)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }
}
