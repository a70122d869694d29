use serde::{Deserialize, Serialize};

/// Host application foreground/background transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppLifecycleEvent {
    Foreground,
    Background,
}
