use crate::domain::value_objects::{CorrelationId, EditTimestamp, ParentId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One buffered local mutation awaiting confirmation from the remote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingEdit<P> {
    pub correlation_id: CorrelationId,
    pub timestamp: EditTimestamp,
    pub payload: P,
}

impl<P> PendingEdit<P> {
    pub fn new(correlation_id: CorrelationId, timestamp: EditTimestamp, payload: P) -> Self {
        Self {
            correlation_id,
            timestamp,
            payload,
        }
    }
}

/// Pending edits of one parent plus the owner snapshot needed to send them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboxEntry<O, P> {
    pub owner: O,
    pub edits: Vec<PendingEdit<P>>,
}

impl<O, P> OutboxEntry<O, P> {
    pub fn new(owner: O) -> Self {
        Self {
            owner,
            edits: Vec::new(),
        }
    }

    pub fn last_timestamp(&self) -> Option<EditTimestamp> {
        self.edits.iter().map(|edit| edit.timestamp).max()
    }
}

/// Pending edits keyed by parent. Serializes as a plain JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Outbox<O, P> {
    entries: BTreeMap<ParentId, OutboxEntry<O, P>>,
}

impl<O, P> Default for Outbox<O, P> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<O, P> Outbox<O, P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no parent holds an edit, including the case of leftover empty entries.
    pub fn is_empty(&self) -> bool {
        self.entries.values().all(|entry| entry.edits.is_empty())
    }

    pub fn edit_count(&self) -> usize {
        self.entries.values().map(|entry| entry.edits.len()).sum()
    }

    pub fn parent_count(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, parent: &ParentId) -> Option<&OutboxEntry<O, P>> {
        self.entries.get(parent)
    }

    pub fn contains_parent(&self, parent: &ParentId) -> bool {
        self.entries.contains_key(parent)
    }

    pub fn correlation_ids(&self) -> impl Iterator<Item = &CorrelationId> {
        self.entries
            .values()
            .flat_map(|entry| entry.edits.iter().map(|edit| &edit.correlation_id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ParentId, &OutboxEntry<O, P>)> {
        self.entries.iter()
    }

    pub fn last_timestamp(&self, parent: &ParentId) -> Option<EditTimestamp> {
        self.entries.get(parent).and_then(OutboxEntry::last_timestamp)
    }

    /// Appends an edit; the owner snapshot is refreshed to the latest one supplied.
    pub fn push_edit(&mut self, parent: ParentId, owner: O, edit: PendingEdit<P>) {
        match self.entries.get_mut(&parent) {
            Some(entry) => {
                entry.owner = owner;
                entry.edits.push(edit);
            }
            None => {
                let mut entry = OutboxEntry::new(owner);
                entry.edits.push(edit);
                self.entries.insert(parent, entry);
            }
        }
    }

    /// Removes one edit and drops the parent once its list runs empty.
    pub fn remove_edit(&mut self, parent: &ParentId, correlation_id: &CorrelationId) -> bool {
        let Some(entry) = self.entries.get_mut(parent) else {
            return false;
        };
        let before = entry.edits.len();
        entry
            .edits
            .retain(|edit| &edit.correlation_id != correlation_id);
        let removed = entry.edits.len() != before;
        if entry.edits.is_empty() {
            self.entries.remove(parent);
        }
        removed
    }

    pub fn discard_parent(&mut self, parent: &ParentId) -> Option<OutboxEntry<O, P>> {
        self.entries.remove(parent)
    }

    pub fn retain_parents<F>(&mut self, mut keep: F) -> Vec<ParentId>
    where
        F: FnMut(&ParentId) -> bool,
    {
        let dropped: Vec<ParentId> = self
            .entries
            .keys()
            .filter(|parent| !keep(parent))
            .cloned()
            .collect();
        for parent in &dropped {
            self.entries.remove(parent);
        }
        dropped
    }

    /// Keeps the edits accepted by `keep`, returning how many were dropped.
    pub fn retain_edits<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&ParentId, &PendingEdit<P>) -> bool,
    {
        let mut dropped = 0;
        for (parent, entry) in self.entries.iter_mut() {
            let before = entry.edits.len();
            entry.edits.retain(|edit| keep(parent, edit));
            dropped += before - entry.edits.len();
        }
        self.prune_empty();
        dropped
    }

    /// Adds the edits of `other` this outbox does not hold yet, matched by correlation id.
    /// Owner snapshots already present are kept.
    pub fn absorb(&mut self, other: Outbox<O, P>) -> usize {
        let mut added = 0;
        for (parent, incoming) in other.entries {
            match self.entries.get_mut(&parent) {
                Some(entry) => {
                    for edit in incoming.edits {
                        if !entry
                            .edits
                            .iter()
                            .any(|existing| existing.correlation_id == edit.correlation_id)
                        {
                            entry.edits.push(edit);
                            added += 1;
                        }
                    }
                }
                None => {
                    added += incoming.edits.len();
                    self.entries.insert(parent, incoming);
                }
            }
        }
        self.prune_empty();
        added
    }

    pub fn prune_empty(&mut self) {
        self.entries.retain(|_, entry| !entry.edits.is_empty());
    }
}

impl<O: Clone, P: Clone> Outbox<O, P> {
    /// Edits of one parent in the order they must reach the remote.
    pub fn edits_sorted(&self, parent: &ParentId) -> Vec<PendingEdit<P>> {
        let mut edits = self
            .entries
            .get(parent)
            .map(|entry| entry.edits.clone())
            .unwrap_or_default();
        edits.sort_by_key(|edit| edit.timestamp);
        edits
    }
}
