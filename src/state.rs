use crate::application::ports::draft_store::DraftStore;
use crate::application::ports::lifecycle_source::LifecycleSource;
use crate::application::ports::outbox_remote::OutboxRemote;
use crate::application::ports::sync_notifier::SyncNotifier;
use crate::application::services::outbox::{
    DebouncedDrain, LifecycleTrigger, OnBackground, OutboxSynchronizer,
};
use crate::application::services::{ChatOutboxService, NoteOutboxService};
use crate::domain::entities::{ChatKind, NoteKind};
use crate::infrastructure::database::ConnectionPool;
use crate::infrastructure::storage::{DraftKey, EncryptedDraftStore, SqliteDraftStore};
use crate::shared::config::AppConfig;
use crate::shared::error::AppError;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::info;

/// Remote entity APIs supplied by the host's storage SDK.
#[derive(Clone)]
pub struct OutboxRemotes {
    pub chat: Arc<dyn OutboxRemote<ChatKind>>,
    pub note: Arc<dyn OutboxRemote<NoteKind>>,
}

/// Everything the outbox needs, built once at process start.
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<dyn DraftStore>,
    pub chat_sync: Arc<OutboxSynchronizer<ChatKind>>,
    pub note_sync: Arc<OutboxSynchronizer<NoteKind>>,
    pub chat_service: Arc<ChatOutboxService>,
    pub note_service: Arc<NoteOutboxService>,
    background: Vec<JoinHandle<()>>,
}

impl AppState {
    pub async fn new(
        config: AppConfig,
        remotes: OutboxRemotes,
        notifier: Arc<dyn SyncNotifier>,
        lifecycle: &dyn LifecycleSource,
    ) -> anyhow::Result<Self> {
        config.validate().map_err(AppError::ConfigurationError)?;
        std::fs::create_dir_all(&config.storage.data_dir)?;

        let pool = ConnectionPool::from_config(&config.database).await?;
        pool.migrate().await?;
        let sqlite = SqliteDraftStore::new(pool);
        let store: Arc<dyn DraftStore> = if config.storage.encrypt_drafts {
            let key = DraftKey::load_or_create(&config.storage.keyring_service)?;
            Arc::new(EncryptedDraftStore::new(sqlite, &key))
        } else {
            Arc::new(sqlite)
        };

        Self::with_store(config, store, remotes, notifier, lifecycle)
    }

    /// Wires the outbox around an already opened store and starts the
    /// restore, debounce and lifecycle tasks.
    pub fn with_store(
        config: AppConfig,
        store: Arc<dyn DraftStore>,
        remotes: OutboxRemotes,
        notifier: Arc<dyn SyncNotifier>,
        lifecycle: &dyn LifecycleSource,
    ) -> anyhow::Result<Self> {
        config.validate().map_err(AppError::ConfigurationError)?;

        let chat_sync = OutboxSynchronizer::<ChatKind>::new(
            config.outbox.chat_storage_key.clone(),
            Arc::clone(&store),
            remotes.chat,
            Arc::clone(&notifier),
        );
        let note_sync = OutboxSynchronizer::<NoteKind>::new(
            config.outbox.note_storage_key.clone(),
            Arc::clone(&store),
            remotes.note,
            notifier,
        );
        chat_sync.start();
        note_sync.start();

        let (debounce, debounce_task) = DebouncedDrain::spawn(
            note_sync.clone(),
            Duration::from_millis(config.outbox.note_debounce_ms),
        );
        let background = vec![
            debounce_task,
            LifecycleTrigger::spawn(lifecycle, OnBackground::Drain(chat_sync.clone())),
            LifecycleTrigger::spawn(lifecycle, OnBackground::ExecuteDebounced(debounce.clone())),
        ];

        let chat_service = Arc::new(ChatOutboxService::new(chat_sync.clone()));
        let note_service = Arc::new(NoteOutboxService::new(note_sync.clone(), debounce));

        info!(
            target: "outbox",
            chat_key = %config.outbox.chat_storage_key,
            note_key = %config.outbox.note_storage_key,
            debounce_ms = config.outbox.note_debounce_ms,
            "outbox state initialized"
        );

        Ok(Self {
            config,
            store,
            chat_sync,
            note_sync,
            chat_service,
            note_service,
            background,
        })
    }

    /// Drops every unsent chat message and note edit of the signed-out account.
    pub async fn logout(&self) -> Result<(), AppError> {
        let chats = self.chat_sync.discard_all().await?;
        let notes = self.note_sync.discard_all().await?;
        info!(target: "outbox", chats, notes, "discarded pending edits on logout");
        Ok(())
    }

    /// Sends whatever is still queued, then stops the background tasks.
    pub async fn shutdown(self) {
        self.chat_sync.drain().await;
        self.note_sync.drain().await;
        for task in &self.background {
            task.abort();
        }
        info!(target: "outbox", "outbox state shut down");
    }
}
