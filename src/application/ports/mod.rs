pub mod draft_store;
pub mod lifecycle_source;
pub mod outbox_remote;
pub mod sync_notifier;
