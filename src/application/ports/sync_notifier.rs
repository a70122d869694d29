use async_trait::async_trait;

/// Non-blocking, user-visible notification about background sync trouble.
#[async_trait]
pub trait SyncNotifier: Send + Sync {
    async fn notify_failure(&self, kind: &str, message: &str);
}

/// Notifier that only logs; used when no UI is attached.
pub struct LogNotifier;

#[async_trait]
impl SyncNotifier for LogNotifier {
    async fn notify_failure(&self, kind: &str, message: &str) {
        tracing::warn!(target: "outbox::notify", kind, message, "sync failure");
    }
}
