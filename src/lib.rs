//! Client-side outbox for chat messages and note content.
//!
//! User edits are queued locally, persisted to a durable draft store and sent
//! to the remote entity API in per-parent timestamp order once it is reachable.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;
pub mod state;

pub use shared::{AppConfig, AppError, Result};
pub use state::{AppState, OutboxRemotes};

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global tracing subscriber. `RUST_LOG` overrides the default filter.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "drive_outbox=debug,info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
