use crate::application::services::outbox::OutboxSynchronizer;
use crate::domain::entities::{ChatKind, ChatMessagePayload, ChatSnapshot, PendingEdit, ReplyRef};
use crate::domain::value_objects::{CorrelationId, ParentId};
use crate::shared::error::AppError;
use std::sync::Arc;

pub struct ChatOutboxService {
    sync: Arc<OutboxSynchronizer<ChatKind>>,
}

impl ChatOutboxService {
    pub fn new(sync: Arc<OutboxSynchronizer<ChatKind>>) -> Self {
        Self { sync }
    }

    /// Queues a message and asks for it to be sent right away. The returned id
    /// lets the UI match the optimistic bubble to the confirmed message.
    pub async fn send_message(
        &self,
        chat: ParentId,
        owner: ChatSnapshot,
        message: &str,
        reply_to: Option<ReplyRef>,
    ) -> Result<CorrelationId, AppError> {
        let trimmed = message.trim();
        if trimmed.is_empty() {
            return Err(AppError::ValidationError(
                "Chat message must not be empty".to_string(),
            ));
        }

        let payload = ChatMessagePayload {
            message: trimmed.to_string(),
            reply_to,
        };
        let edit = self.sync.enqueue(chat, owner, payload).await?;

        self.request_sync();
        Ok(edit.correlation_id)
    }

    /// Messages of `chat` that are still on their way, oldest first.
    pub fn pending_messages(&self, chat: &ParentId) -> Vec<PendingEdit<ChatMessagePayload>> {
        self.sync.mirror().edits_for(chat)
    }

    pub fn send_error(&self, correlation_id: &CorrelationId) -> Option<String> {
        self.sync.errors().get(correlation_id)
    }

    /// Clears the failure flag of a message and tries the outbox again.
    pub fn retry(&self, correlation_id: &CorrelationId) {
        self.sync.clear_error(correlation_id);
        self.request_sync();
    }

    /// Drops queued messages of a chat the user left or deleted.
    pub async fn forget_chat(&self, chat: &ParentId) -> Result<usize, AppError> {
        self.sync.discard_parent(chat).await
    }

    fn request_sync(&self) {
        let sync = Arc::clone(&self.sync);
        tokio::spawn(async move {
            sync.drain().await;
        });
    }
}
