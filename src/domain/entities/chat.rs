use super::outbox_kind::OutboxKind;
use serde::{Deserialize, Serialize};

/// The message a queued chat message answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyRef {
    pub message_id: String,
    pub sender_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessagePayload {
    pub message: String,
    pub reply_to: Option<ReplyRef>,
}

/// What the remote needs to know about a chat to encrypt and send into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSnapshot {
    pub participants: Vec<String>,
    pub key_metadata: String,
}

pub struct ChatKind;

impl OutboxKind for ChatKind {
    type Owner = ChatSnapshot;
    type Payload = ChatMessagePayload;

    const LABEL: &'static str = "chat";
}
