pub mod chat;
pub mod lifecycle;
pub mod note;
pub mod outbox_kind;
pub mod pending_edit;

pub use chat::{ChatKind, ChatMessagePayload, ChatSnapshot, ReplyRef};
pub use lifecycle::AppLifecycleEvent;
pub use note::{NoteContentPayload, NoteKind, NoteSnapshot, NoteType};
pub use outbox_kind::{OutboxKind, OutboxOf, RemoteParent};
pub use pending_edit::{Outbox, OutboxEntry, PendingEdit};
