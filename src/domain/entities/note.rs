use super::outbox_kind::{OutboxKind, RemoteParent};
use super::pending_edit::PendingEdit;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteType {
    Text,
    Markdown,
    Code,
    Rich,
    Checklist,
}

impl NoteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteType::Text => "text",
            NoteType::Markdown => "markdown",
            NoteType::Code => "code",
            NoteType::Rich => "rich",
            NoteType::Checklist => "checklist",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteContentPayload {
    pub content: String,
    pub note_type: NoteType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteSnapshot {
    pub title: String,
    pub note_type: NoteType,
}

pub struct NoteKind;

impl OutboxKind for NoteKind {
    type Owner = NoteSnapshot;
    type Payload = NoteContentPayload;

    const LABEL: &'static str = "note";

    /// A remote edit at or after the buffered one wins; only strictly newer drafts survive.
    fn superseded_by_remote(parent: &RemoteParent, edit: &PendingEdit<Self::Payload>) -> bool {
        match parent.edited_at {
            Some(edited_at) => edit.timestamp <= edited_at,
            None => false,
        }
    }
}
