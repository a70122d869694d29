use crate::domain::entities::{OutboxKind, OutboxOf, PendingEdit};
use crate::domain::value_objects::ParentId;
use tokio::sync::watch;

/// Observable in-process copy of an outbox. UI readers subscribe; every write
/// goes through [`OutboxMirror::update`] or [`OutboxMirror::set_all`].
pub struct OutboxMirror<K: OutboxKind> {
    state: watch::Sender<OutboxOf<K>>,
}

impl<K: OutboxKind> OutboxMirror<K> {
    pub fn new() -> Self {
        let (state, _) = watch::channel(OutboxOf::<K>::new());
        Self { state }
    }

    pub fn set_all(&self, outbox: OutboxOf<K>) {
        self.state.send_replace(outbox);
    }

    pub fn update<F>(&self, apply: F)
    where
        F: FnOnce(&mut OutboxOf<K>),
    {
        self.state.send_modify(apply);
    }

    pub fn snapshot(&self) -> OutboxOf<K> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<OutboxOf<K>> {
        self.state.subscribe()
    }

    pub fn edits_for(&self, parent: &ParentId) -> Vec<PendingEdit<K::Payload>> {
        self.state.borrow().edits_sorted(parent)
    }

    pub fn edit_count(&self) -> usize {
        self.state.borrow().edit_count()
    }
}

impl<K: OutboxKind> Default for OutboxMirror<K> {
    fn default() -> Self {
        Self::new()
    }
}
