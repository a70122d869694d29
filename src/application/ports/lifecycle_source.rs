use crate::domain::entities::AppLifecycleEvent;
use tokio::sync::broadcast;

/// Source of host application foreground/background transitions.
pub trait LifecycleSource: Send + Sync {
    fn subscribe(&self) -> broadcast::Receiver<AppLifecycleEvent>;
}
