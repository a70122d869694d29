use super::pending_edit::{Outbox, PendingEdit};
use crate::domain::value_objects::{EditTimestamp, ParentId};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::Debug;

/// A parent entity as reported by the remote `list_parents` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteParent {
    pub id: ParentId,
    /// Last time the parent itself was edited remotely, when the remote tracks it.
    pub edited_at: Option<EditTimestamp>,
}

impl RemoteParent {
    pub fn new(id: ParentId) -> Self {
        Self {
            id,
            edited_at: None,
        }
    }

    pub fn with_edited_at(mut self, edited_at: EditTimestamp) -> Self {
        self.edited_at = Some(edited_at);
        self
    }
}

/// Binds the payload and owner types of one entity kind that gets an outbox.
pub trait OutboxKind: Send + Sync + 'static {
    type Owner: Serialize + DeserializeOwned + Clone + Debug + PartialEq + Send + Sync + 'static;
    type Payload: Serialize + DeserializeOwned + Clone + Debug + PartialEq + Send + Sync + 'static;

    /// Short name used in log fields and user notifications.
    const LABEL: &'static str;

    /// Whether the remote copy of `parent` makes this buffered edit obsolete.
    fn superseded_by_remote(_parent: &RemoteParent, _edit: &PendingEdit<Self::Payload>) -> bool {
        false
    }
}

/// The outbox map for kind `K`.
pub type OutboxOf<K> = Outbox<<K as OutboxKind>::Owner, <K as OutboxKind>::Payload>;
