use crate::shared::error::AppError;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

/// Durable key-value store holding serialized draft blobs.
#[async_trait]
pub trait DraftStore: Send + Sync {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, AppError>;
    async fn set_raw(&self, key: &str, value: &str) -> Result<(), AppError>;
    async fn remove(&self, key: &str) -> Result<(), AppError>;
}

/// Typed access on top of [`DraftStore`].
///
/// `get` never fails: a missing, unreadable or corrupted value reads as `None`.
/// `set` propagates both serialization and storage failures.
#[async_trait]
pub trait DraftStoreExt: DraftStore {
    async fn get<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned + Send,
    {
        let raw = match self.get_raw(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!(target: "storage::drafts", key, error = %err, "failed to read draft blob");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(target: "storage::drafts", key, error = %err, "discarding corrupted draft blob");
                None
            }
        }
    }

    async fn set<T>(&self, key: &str, value: &T) -> Result<(), AppError>
    where
        T: Serialize + Sync,
    {
        let json = serde_json::to_string(value)?;
        self.set_raw(key, &json).await
    }
}

impl<S: DraftStore + ?Sized> DraftStoreExt for S {}
