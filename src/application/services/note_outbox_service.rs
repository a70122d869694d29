use crate::application::services::outbox::{DebouncedDrain, OutboxSynchronizer};
use crate::domain::entities::{NoteContentPayload, NoteKind, NoteSnapshot, NoteType};
use crate::domain::value_objects::{CorrelationId, ParentId};
use crate::shared::error::AppError;
use std::sync::Arc;
use tracing::debug;

/// Buffers note edits while the user is typing; the debounce decides when they go out.
pub struct NoteOutboxService {
    sync: Arc<OutboxSynchronizer<NoteKind>>,
    debounce: DebouncedDrain,
}

impl NoteOutboxService {
    pub fn new(sync: Arc<OutboxSynchronizer<NoteKind>>, debounce: DebouncedDrain) -> Self {
        Self { sync, debounce }
    }

    pub async fn save_content(
        &self,
        note: ParentId,
        owner: NoteSnapshot,
        content: String,
        note_type: NoteType,
    ) -> Result<CorrelationId, AppError> {
        debug!(
            target: "outbox::note",
            %note,
            note_type = note_type.as_str(),
            len = content.len(),
            "buffering note content"
        );
        let edit = self
            .sync
            .enqueue(note, owner, NoteContentPayload { content, note_type })
            .await?;
        self.debounce.touch();
        Ok(edit.correlation_id)
    }

    /// Newest unsent content of `note`, shown instead of the remote copy.
    pub fn pending_content(&self, note: &ParentId) -> Option<NoteContentPayload> {
        self.sync
            .mirror()
            .edits_for(note)
            .pop()
            .map(|edit| edit.payload)
    }

    pub fn has_pending(&self, note: &ParentId) -> bool {
        !self.sync.mirror().edits_for(note).is_empty()
    }

    pub fn save_error(&self, correlation_id: &CorrelationId) -> Option<String> {
        self.sync.errors().get(correlation_id)
    }

    /// Sends buffered content now, e.g. when the editor closes.
    pub fn flush_now(&self) {
        self.debounce.execute_now();
    }
}
