use super::debounce::DebouncedDrain;
use super::synchronizer::DrainTarget;
use crate::application::ports::lifecycle_source::LifecycleSource;
use crate::domain::entities::AppLifecycleEvent;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// What to do when the app moves to the background.
#[derive(Clone)]
pub enum OnBackground {
    /// Drain right away (chat messages).
    Drain(Arc<dyn DrainTarget>),
    /// Cut the debounce short (note content).
    ExecuteDebounced(DebouncedDrain),
}

impl OnBackground {
    async fn fire(&self) {
        match self {
            OnBackground::Drain(target) => {
                target.drain_now().await;
            }
            OnBackground::ExecuteDebounced(debounce) => debounce.execute_now(),
        }
    }
}

pub struct LifecycleTrigger;

impl LifecycleTrigger {
    /// Listens until the lifecycle source closes.
    pub fn spawn(source: &dyn LifecycleSource, action: OnBackground) -> JoinHandle<()> {
        let mut events = source.subscribe();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(AppLifecycleEvent::Background) => {
                        debug!(target: "outbox::lifecycle", "app moved to background");
                        action.fire().await;
                    }
                    Ok(AppLifecycleEvent::Foreground) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        // A missed event may have been a background transition.
                        warn!(target: "outbox::lifecycle", skipped, "lifecycle events lagged");
                        action.fire().await;
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::outbox::synchronizer::DrainReport;
    use crate::infrastructure::lifecycle::BroadcastLifecycle;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Default)]
    struct CountingTarget {
        drains: AtomicU32,
    }

    #[async_trait]
    impl DrainTarget for CountingTarget {
        async fn drain_now(&self) -> DrainReport {
            self.drains.fetch_add(1, Ordering::SeqCst);
            DrainReport::default()
        }
    }

    #[tokio::test]
    async fn background_drains_and_foreground_does_not() {
        let lifecycle = BroadcastLifecycle::new();
        let target = Arc::new(CountingTarget::default());
        let handle = LifecycleTrigger::spawn(&lifecycle, OnBackground::Drain(target.clone()));

        lifecycle.emit(AppLifecycleEvent::Foreground);
        lifecycle.emit(AppLifecycleEvent::Background);
        lifecycle.emit(AppLifecycleEvent::Foreground);
        drop(lifecycle);

        handle.await.unwrap();
        assert_eq!(target.drains.load(Ordering::SeqCst), 1);
    }
}
