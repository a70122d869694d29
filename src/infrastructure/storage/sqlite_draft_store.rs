use crate::application::ports::draft_store::DraftStore;
use crate::infrastructure::database::ConnectionPool;
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;

/// Draft blobs in the embedded SQLite database, one row per key.
pub struct SqliteDraftStore {
    pool: ConnectionPool,
}

impl SqliteDraftStore {
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    /// Opens the pool and applies migrations.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, AppError> {
        let pool = ConnectionPool::new(database_url, max_connections).await?;
        pool.migrate().await?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl DraftStore for SqliteDraftStore {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, AppError> {
        let row = sqlx::query(r#"SELECT value FROM draft_store WHERE key = ?1"#)
            .bind(key)
            .fetch_optional(self.pool.get_pool())
            .await?;

        Ok(match row {
            Some(row) => Some(row.try_get::<String, _>("value")?),
            None => None,
        })
    }

    async fn set_raw(&self, key: &str, value: &str) -> Result<(), AppError> {
        let now = Utc::now().timestamp_millis();
        sqlx::query(
            r#"
            INSERT INTO draft_store (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(self.pool.get_pool())
        .await?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), AppError> {
        sqlx::query(r#"DELETE FROM draft_store WHERE key = ?1"#)
            .bind(key)
            .execute(self.pool.get_pool())
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::draft_store::DraftStoreExt;
    use serde_json::json;

    async fn setup_store() -> SqliteDraftStore {
        let pool = ConnectionPool::from_memory().await.unwrap();
        pool.migrate().await.unwrap();
        SqliteDraftStore::new(pool)
    }

    #[tokio::test]
    async fn set_overwrites_and_remove_deletes() {
        let store = setup_store().await;

        store.set_raw("outbox", "{\"a\":1}").await.unwrap();
        store.set_raw("outbox", "{\"a\":2}").await.unwrap();
        assert_eq!(
            store.get_raw("outbox").await.unwrap().as_deref(),
            Some("{\"a\":2}")
        );

        store.remove("outbox").await.unwrap();
        assert!(store.get_raw("outbox").await.unwrap().is_none());
        // Removing an absent key is not an error.
        store.remove("outbox").await.unwrap();
    }

    #[tokio::test]
    async fn corrupted_value_reads_as_absent() {
        let store = setup_store().await;
        store.set_raw("outbox", "not json").await.unwrap();

        let value: Option<serde_json::Value> = store.get("outbox").await;
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn typed_roundtrip_through_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}?mode=rwc", dir.path().join("drafts.db").display());

        {
            let store = SqliteDraftStore::connect(&url, 1).await.unwrap();
            store
                .set("outbox", &json!({"chatA": {"edits": []}}))
                .await
                .unwrap();
        }

        let reopened = SqliteDraftStore::connect(&url, 1).await.unwrap();
        let value: serde_json::Value = reopened.get("outbox").await.unwrap();
        assert_eq!(value["chatA"]["edits"], json!([]));
    }
}
