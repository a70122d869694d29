pub mod broadcast_lifecycle;

pub use broadcast_lifecycle::BroadcastLifecycle;
