use crate::domain::value_objects::CorrelationId;
use std::collections::BTreeMap;
use tokio::sync::watch;

/// Last send error per edit, observable so the UI can flag failed messages and notes.
pub struct SyncErrorMap {
    errors: watch::Sender<BTreeMap<CorrelationId, String>>,
}

impl SyncErrorMap {
    pub fn new() -> Self {
        let (errors, _) = watch::channel(BTreeMap::new());
        Self { errors }
    }

    pub fn record(&self, correlation_id: CorrelationId, message: String) {
        self.errors.send_modify(|errors| {
            errors.insert(correlation_id, message);
        });
    }

    pub fn clear(&self, correlation_id: &CorrelationId) -> bool {
        self.errors
            .send_if_modified(|errors| errors.remove(correlation_id).is_some())
    }

    pub fn get(&self, correlation_id: &CorrelationId) -> Option<String> {
        self.errors.borrow().get(correlation_id).cloned()
    }

    pub fn snapshot(&self) -> BTreeMap<CorrelationId, String> {
        self.errors.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<BTreeMap<CorrelationId, String>> {
        self.errors.subscribe()
    }

    pub fn len(&self) -> usize {
        self.errors.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.borrow().is_empty()
    }
}

impl Default for SyncErrorMap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_and_clear() {
        let map = SyncErrorMap::new();
        let id = CorrelationId::generate();

        map.record(id.clone(), "boom".into());
        assert_eq!(map.get(&id).as_deref(), Some("boom"));
        assert_eq!(map.len(), 1);

        assert!(map.clear(&id));
        assert!(!map.clear(&id));
        assert!(map.is_empty());
    }
}
