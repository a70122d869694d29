pub mod draft_key;
pub mod encrypted_draft_store;
pub mod memory_draft_store;
pub mod sqlite_draft_store;

pub use draft_key::DraftKey;
pub use encrypted_draft_store::EncryptedDraftStore;
pub use memory_draft_store::MemoryDraftStore;
pub use sqlite_draft_store::SqliteDraftStore;
