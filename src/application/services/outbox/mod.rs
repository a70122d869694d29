pub mod debounce;
pub mod error_map;
pub mod lifecycle_trigger;
pub mod mirror;
pub mod readiness;
pub mod synchronizer;

pub use debounce::DebouncedDrain;
pub use error_map::SyncErrorMap;
pub use lifecycle_trigger::{LifecycleTrigger, OnBackground};
pub use mirror::OutboxMirror;
pub use readiness::{InitGate, InitState};
pub use synchronizer::{DrainReport, DrainTarget, OutboxSynchronizer, RestoreReport};
