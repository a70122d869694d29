use crate::domain::entities::{OutboxKind, PendingEdit, RemoteParent};
use crate::domain::value_objects::ParentId;
use crate::shared::error::AppError;
use async_trait::async_trait;

/// Remote entity API of the storage SDK for one outbox kind.
///
/// Delivery is at-least-once: an edit whose send succeeded may be sent again
/// when the store could not record it. Deduplicate by correlation id.
#[async_trait]
pub trait OutboxRemote<K: OutboxKind>: Send + Sync {
    /// Authoritative list of parents the account can still write to.
    async fn list_parents(&self) -> Result<Vec<RemoteParent>, AppError>;

    async fn send_edit(
        &self,
        parent: &ParentId,
        owner: &K::Owner,
        edit: &PendingEdit<K::Payload>,
    ) -> Result<(), AppError>;
}
