pub mod chat_outbox_service;
pub mod note_outbox_service;
pub mod outbox;

pub use chat_outbox_service::ChatOutboxService;
pub use note_outbox_service::NoteOutboxService;
