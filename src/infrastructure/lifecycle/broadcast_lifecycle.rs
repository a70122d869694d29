use crate::application::ports::lifecycle_source::LifecycleSource;
use crate::domain::entities::AppLifecycleEvent;
use tokio::sync::broadcast;
use tracing::trace;

const CHANNEL_CAPACITY: usize = 16;

/// In-process lifecycle feed; the host shell calls [`emit`](Self::emit).
pub struct BroadcastLifecycle {
    tx: broadcast::Sender<AppLifecycleEvent>,
}

impl BroadcastLifecycle {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Returns how many listeners saw the event.
    pub fn emit(&self, event: AppLifecycleEvent) -> usize {
        trace!(target: "outbox::lifecycle", ?event, "lifecycle event");
        self.tx.send(event).unwrap_or(0)
    }
}

impl Default for BroadcastLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecycleSource for BroadcastLifecycle {
    fn subscribe(&self) -> broadcast::Receiver<AppLifecycleEvent> {
        self.tx.subscribe()
    }
}
