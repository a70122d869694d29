use crate::application::ports::draft_store::DraftStore;
use crate::shared::error::AppError;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Volatile store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryDraftStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.values.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.values.read().await.is_empty()
    }
}

#[async_trait]
impl DraftStore for MemoryDraftStore {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set_raw(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), AppError> {
        self.values.write().await.remove(key);
        Ok(())
    }
}
