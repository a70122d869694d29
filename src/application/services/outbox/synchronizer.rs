use super::error_map::SyncErrorMap;
use super::mirror::OutboxMirror;
use super::readiness::{InitGate, InitState};
use crate::application::ports::draft_store::{DraftStore, DraftStoreExt};
use crate::application::ports::outbox_remote::OutboxRemote;
use crate::application::ports::sync_notifier::SyncNotifier;
use crate::domain::entities::{OutboxEntry, OutboxKind, OutboxOf, PendingEdit, RemoteParent};
use crate::domain::value_objects::{CorrelationId, EditTimestamp, ParentId};
use crate::shared::error::AppError;
use async_trait::async_trait;
use futures::future::join_all;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Something a lifecycle trigger can ask to push its pending work out.
#[async_trait]
pub trait DrainTarget: Send + Sync {
    async fn drain_now(&self) -> DrainReport;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DrainReport {
    pub sent: u32,
    pub failed: u32,
    pub pending: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RestoreReport {
    pub restored: u32,
    pub discarded_parents: u32,
    pub superseded: u32,
    /// Set when surviving edits triggered a drain right after restore.
    pub drain: Option<DrainReport>,
}

#[derive(Debug, Default)]
struct ParentOutcome {
    sent: u32,
    failed: u32,
}

/// Write-behind outbox for one entity kind.
///
/// The mirror is written first; the draft store follows through
/// [`OutboxSynchronizer::flush_to_disk`]. A drain sends edits per parent in
/// timestamp order and stops a parent at its first failure.
pub struct OutboxSynchronizer<K: OutboxKind> {
    storage_key: String,
    store: Arc<dyn DraftStore>,
    remote: Arc<dyn OutboxRemote<K>>,
    notifier: Arc<dyn SyncNotifier>,
    mirror: OutboxMirror<K>,
    errors: SyncErrorMap,
    init: InitGate,
    // Restore and drain take both locks, sync first. Flushes take only storage.
    sync_lock: Mutex<()>,
    storage_lock: Mutex<()>,
    // Orders blob writes issued by concurrently drained parents.
    write_gate: Mutex<()>,
    // Discarded edits that may still be in the store until the discard is flushed.
    discarded: Mutex<HashSet<CorrelationId>>,
}

impl<K: OutboxKind> OutboxSynchronizer<K> {
    pub fn new(
        storage_key: impl Into<String>,
        store: Arc<dyn DraftStore>,
        remote: Arc<dyn OutboxRemote<K>>,
        notifier: Arc<dyn SyncNotifier>,
    ) -> Arc<Self> {
        Arc::new(Self {
            storage_key: storage_key.into(),
            store,
            remote,
            notifier,
            mirror: OutboxMirror::new(),
            errors: SyncErrorMap::new(),
            init: InitGate::new(),
            sync_lock: Mutex::new(()),
            storage_lock: Mutex::new(()),
            write_gate: Mutex::new(()),
            discarded: Mutex::new(HashSet::new()),
        })
    }

    /// Spawns the one-time restore. Flushes and drains wait for it to finish.
    pub fn start(self: &Arc<Self>) -> JoinHandle<RestoreReport> {
        let synchronizer = Arc::clone(self);
        tokio::spawn(async move { synchronizer.restore().await })
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn mirror(&self) -> &OutboxMirror<K> {
        &self.mirror
    }

    pub fn errors(&self) -> &SyncErrorMap {
        &self.errors
    }

    pub fn init_state(&self) -> InitState {
        self.init.state()
    }

    pub fn pending_count(&self) -> usize {
        self.mirror.edit_count()
    }

    /// Loads the durable outbox, drops edits the remote has made obsolete and
    /// publishes the rest to the mirror. Runs at most once; failures leave the
    /// outbox empty in memory and are only logged.
    pub async fn restore(&self) -> RestoreReport {
        if !self.init.begin() {
            debug!(target: "outbox", kind = K::LABEL, "restore already ran");
            return RestoreReport::default();
        }

        let mut report = {
            let _sync = self.sync_lock.lock().await;
            let storage = self.storage_lock.lock().await;

            match self.try_restore(&storage).await {
                Ok(report) => report,
                Err(err) => {
                    warn!(
                        target: "outbox",
                        kind = K::LABEL,
                        error = %err,
                        "outbox restore failed, continuing with an empty outbox"
                    );
                    RestoreReport::default()
                }
            }
        };
        self.init.complete();

        info!(
            target: "outbox",
            kind = K::LABEL,
            restored = report.restored,
            discarded_parents = report.discarded_parents,
            superseded = report.superseded,
            "outbox restored"
        );

        if report.restored > 0 {
            report.drain = Some(self.drain().await);
        }
        report
    }

    async fn try_restore(&self, storage: &MutexGuard<'_, ()>) -> Result<RestoreReport, AppError> {
        let Some(mut outbox) = self.store.get::<OutboxOf<K>>(&self.storage_key).await else {
            return Ok(RestoreReport::default());
        };

        let remote: HashMap<ParentId, RemoteParent> = self
            .remote
            .list_parents()
            .await?
            .into_iter()
            .map(|parent| (parent.id.clone(), parent))
            .collect();

        let dropped = outbox.retain_parents(|parent| remote.contains_key(parent));
        for parent in &dropped {
            debug!(target: "outbox", kind = K::LABEL, %parent, "parent gone remotely, dropping its edits");
        }

        let superseded = outbox.retain_edits(|parent, edit| match remote.get(parent) {
            Some(remote_parent) => !K::superseded_by_remote(remote_parent, edit),
            None => false,
        });

        if !dropped.is_empty() || superseded > 0 {
            // Drains read the store, so discarded edits must leave it too.
            self.write_outbox(storage, &mut outbox).await?;
        }

        let restored = outbox.edit_count() as u32;
        self.mirror.update(|current| {
            // Keep anything the UI queued while restore was running.
            let early = std::mem::replace(current, outbox);
            current.absorb(early);
        });

        Ok(RestoreReport {
            restored,
            discarded_parents: dropped.len() as u32,
            superseded: superseded as u32,
            drain: None,
        })
    }

    /// Queues a local edit and persists the outbox. A failed write is logged and
    /// retried by the next flush; the edit stays queued in memory.
    pub async fn enqueue(
        &self,
        parent: ParentId,
        owner: K::Owner,
        payload: K::Payload,
    ) -> Result<PendingEdit<K::Payload>, AppError> {
        let mut queued = None;
        self.mirror.update(|outbox| {
            let timestamp =
                EditTimestamp::next_after(outbox.last_timestamp(&parent), EditTimestamp::now());
            let edit = PendingEdit::new(CorrelationId::generate(), timestamp, payload);
            outbox.push_edit(parent.clone(), owner, edit.clone());
            queued = Some(edit);
        });
        let edit = queued.ok_or_else(|| AppError::Internal("outbox update did not run".into()))?;

        debug!(
            target: "outbox",
            kind = K::LABEL,
            %parent,
            correlation_id = %edit.correlation_id,
            "edit queued"
        );

        if let Err(err) = self.flush_to_disk().await {
            warn!(
                target: "outbox",
                kind = K::LABEL,
                %parent,
                error = %err,
                "failed to persist outbox, edit kept in memory"
            );
        }
        Ok(edit)
    }

    /// Drops every pending edit of `parent`, e.g. after the user deleted it locally.
    pub async fn discard_parent(&self, parent: &ParentId) -> Result<usize, AppError> {
        let mut removed = None;
        self.mirror.update(|outbox| {
            removed = outbox.discard_parent(parent);
        });
        let ids: Vec<CorrelationId> = removed
            .map(|entry| {
                entry
                    .edits
                    .into_iter()
                    .map(|edit| edit.correlation_id)
                    .collect()
            })
            .unwrap_or_default();
        self.forget_edits(ids).await
    }

    /// Forgets the whole outbox, for instance on logout.
    pub async fn discard_all(&self) -> Result<usize, AppError> {
        let mut removed = OutboxOf::<K>::new();
        self.mirror.update(|outbox| {
            removed = std::mem::take(outbox);
        });
        let ids: Vec<CorrelationId> = removed.correlation_ids().cloned().collect();
        self.forget_edits(ids).await
    }

    /// Keeps already removed edits from being sent or absorbed back from the
    /// store by a drain that read it before the removal was flushed.
    async fn forget_edits(&self, ids: Vec<CorrelationId>) -> Result<usize, AppError> {
        for id in &ids {
            self.errors.clear(id);
        }
        self.discarded.lock().await.extend(ids.iter().cloned());

        self.flush_to_disk().await?;

        let mut discarded = self.discarded.lock().await;
        for id in &ids {
            discarded.remove(id);
        }
        Ok(ids.len())
    }

    pub fn clear_error(&self, correlation_id: &CorrelationId) -> bool {
        self.errors.clear(correlation_id)
    }

    /// Writes the current mirror to the draft store.
    pub async fn flush_to_disk(&self) -> Result<(), AppError> {
        // Wait before locking: restore needs the storage lock to complete.
        self.init.wait_ready().await;
        let storage = self.storage_lock.lock().await;
        self.persist_snapshot(&storage).await
    }

    /// Flush path for callers that already hold the storage lock.
    async fn persist_snapshot(&self, storage: &MutexGuard<'_, ()>) -> Result<(), AppError> {
        let _write = self.write_gate.lock().await;
        let mut snapshot = self.mirror.snapshot();
        self.write_outbox(storage, &mut snapshot).await
    }

    async fn write_outbox(
        &self,
        _storage: &MutexGuard<'_, ()>,
        outbox: &mut OutboxOf<K>,
    ) -> Result<(), AppError> {
        if outbox.is_empty() {
            return self.store.remove(&self.storage_key).await;
        }
        outbox.prune_empty();
        self.store.set(&self.storage_key, outbox).await
    }

    /// Sends everything in the durable outbox. Never fails: errors are logged
    /// and surfaced to the user as a notification.
    pub async fn drain(&self) -> DrainReport {
        match self.try_drain().await {
            Ok(report) => {
                if report.sent > 0 || report.failed > 0 {
                    info!(
                        target: "outbox",
                        kind = K::LABEL,
                        sent = report.sent,
                        failed = report.failed,
                        pending = report.pending,
                        "outbox drained"
                    );
                }
                report
            }
            Err(err) => {
                error!(target: "outbox", kind = K::LABEL, error = %err, "outbox drain failed");
                self.notifier
                    .notify_failure(K::LABEL, &format!("Could not sync pending changes: {err}"))
                    .await;
                DrainReport {
                    pending: self.pending_count() as u32,
                    ..DrainReport::default()
                }
            }
        }
    }

    async fn try_drain(&self) -> Result<DrainReport, AppError> {
        self.init.wait_ready().await;
        let _sync = self.sync_lock.lock().await;
        let storage = self.storage_lock.lock().await;

        // The store is the source of truth; the mirror may hold unflushed edits.
        let Some(mut outbox) = self.store.get::<OutboxOf<K>>(&self.storage_key).await else {
            return Ok(DrainReport {
                pending: self.pending_count() as u32,
                ..DrainReport::default()
            });
        };
        {
            let discarded = self.discarded.lock().await;
            if !discarded.is_empty() {
                outbox.retain_edits(|_, edit| !discarded.contains(&edit.correlation_id));
            }
        }

        // Successful sends rewrite the store from the mirror, so the mirror
        // must hold every stored edit before the first write.
        let recovered = outbox.clone();
        self.mirror.update(|current| {
            current.absorb(recovered);
        });

        let outcomes = join_all(
            outbox
                .iter()
                .map(|(parent, entry)| self.drain_parent(&storage, parent, entry)),
        )
        .await;

        let mut report = DrainReport::default();
        let mut first_error = None;
        for outcome in outcomes {
            match outcome {
                Ok(outcome) => {
                    report.sent += outcome.sent;
                    report.failed += outcome.failed;
                }
                Err(err) => {
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
            }
        }
        if let Some(err) = first_error {
            return Err(err);
        }

        report.pending = self.pending_count() as u32;
        Ok(report)
    }

    async fn drain_parent(
        &self,
        storage: &MutexGuard<'_, ()>,
        parent: &ParentId,
        entry: &OutboxEntry<K::Owner, K::Payload>,
    ) -> Result<ParentOutcome, AppError> {
        let mut edits = entry.edits.clone();
        edits.sort_by_key(|edit| edit.timestamp);

        let mut outcome = ParentOutcome::default();
        for edit in &edits {
            if self.discarded.lock().await.contains(&edit.correlation_id) {
                debug!(
                    target: "outbox",
                    kind = K::LABEL,
                    %parent,
                    "parent discarded during drain, skipping its remaining edits"
                );
                break;
            }
            match self.remote.send_edit(parent, &entry.owner, edit).await {
                Ok(()) => {
                    self.mirror.update(|outbox| {
                        outbox.remove_edit(parent, &edit.correlation_id);
                    });
                    self.errors.clear(&edit.correlation_id);
                    // The next edit of this parent waits until the store agrees.
                    self.persist_snapshot(storage).await?;
                    outcome.sent += 1;
                }
                Err(err) => {
                    if err.is_transient() {
                        warn!(
                            target: "outbox",
                            kind = K::LABEL,
                            %parent,
                            correlation_id = %edit.correlation_id,
                            error = %err,
                            "send failed, holding remaining edits of this parent"
                        );
                    } else {
                        error!(
                            target: "outbox",
                            kind = K::LABEL,
                            %parent,
                            correlation_id = %edit.correlation_id,
                            error = %err,
                            "send rejected, holding remaining edits of this parent"
                        );
                    }
                    self.errors
                        .record(edit.correlation_id.clone(), err.to_string());
                    outcome.failed += 1;
                    break;
                }
            }
        }
        Ok(outcome)
    }
}

#[async_trait]
impl<K: OutboxKind> DrainTarget for OutboxSynchronizer<K> {
    async fn drain_now(&self) -> DrainReport {
        self.drain().await
    }
}
