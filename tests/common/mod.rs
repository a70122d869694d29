#![allow(dead_code)]

use async_trait::async_trait;
use drive_outbox::application::ports::draft_store::DraftStore;
use drive_outbox::application::ports::outbox_remote::OutboxRemote;
use drive_outbox::application::ports::sync_notifier::SyncNotifier;
use drive_outbox::domain::entities::{
    ChatKind, ChatMessagePayload, ChatSnapshot, NoteContentPayload, NoteKind, NoteSnapshot,
    NoteType, PendingEdit, RemoteParent,
};
use drive_outbox::domain::value_objects::{CorrelationId, EditTimestamp, ParentId};
use drive_outbox::infrastructure::storage::MemoryDraftStore;
use drive_outbox::shared::error::AppError;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Notify;
use tokio::time::{Duration, Instant, sleep};

pub const CHAT_KEY: &str = "chatMessagesOutbox";
pub const NOTE_KEY: &str = "noteContentOutbox";

pub fn parent(id: &str) -> ParentId {
    ParentId::new(id.to_string()).expect("valid parent id")
}

pub fn chat_owner() -> ChatSnapshot {
    ChatSnapshot {
        participants: vec!["alice".into(), "bob".into()],
        key_metadata: "k1".into(),
    }
}

pub fn note_owner() -> NoteSnapshot {
    NoteSnapshot {
        title: "Plans".into(),
        note_type: NoteType::Text,
    }
}

pub fn chat_edit(millis: i64, message: &str) -> PendingEdit<ChatMessagePayload> {
    PendingEdit::new(
        CorrelationId::generate(),
        EditTimestamp::from_millis(millis),
        ChatMessagePayload {
            message: message.into(),
            reply_to: None,
        },
    )
}

pub fn note_edit(millis: i64, content: &str) -> PendingEdit<NoteContentPayload> {
    PendingEdit::new(
        CorrelationId::generate(),
        EditTimestamp::from_millis(millis),
        NoteContentPayload {
            content: content.into(),
            note_type: NoteType::Text,
        },
    )
}

/// Polls `check` until it holds or two seconds pass.
pub async fn eventually<F: Fn() -> bool>(check: F) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if check() {
            return true;
        }
        sleep(Duration::from_millis(10)).await;
    }
    check()
}

/// Remote that serves a fixed parent list and records every accepted send as
/// `"<parent>:<text>"`. Texts listed in `failing` are rejected.
#[derive(Default)]
pub struct ScriptedRemote {
    parents: Mutex<Vec<RemoteParent>>,
    failing: Mutex<HashSet<String>>,
    offline: AtomicBool,
    list_calls: AtomicUsize,
    sent: Mutex<Vec<String>>,
    send_delay: Option<Duration>,
}

impl ScriptedRemote {
    pub fn with_parents(ids: &[&str]) -> Self {
        let remote = Self::default();
        *remote.parents.lock().unwrap() = ids.iter().map(|id| RemoteParent::new(parent(id))).collect();
        remote
    }

    pub fn with_remote_parents(parents: Vec<RemoteParent>) -> Self {
        let remote = Self::default();
        *remote.parents.lock().unwrap() = parents;
        remote
    }

    pub fn with_send_delay(mut self, delay: Duration) -> Self {
        self.send_delay = Some(delay);
        self
    }

    pub fn fail_on(self, text: &str) -> Self {
        self.failing.lock().unwrap().insert(text.to_string());
        self
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    async fn record(&self, parent: &ParentId, text: &str) -> Result<(), AppError> {
        if let Some(delay) = self.send_delay {
            sleep(delay).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(AppError::Network("remote unreachable".into()));
        }
        if self.failing.lock().unwrap().contains(text) {
            return Err(AppError::Remote(format!("rejected {text}")));
        }
        self.sent.lock().unwrap().push(format!("{parent}:{text}"));
        Ok(())
    }

    fn list(&self) -> Result<Vec<RemoteParent>, AppError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(AppError::Network("remote unreachable".into()));
        }
        Ok(self.parents.lock().unwrap().clone())
    }
}

#[async_trait]
impl OutboxRemote<ChatKind> for ScriptedRemote {
    async fn list_parents(&self) -> Result<Vec<RemoteParent>, AppError> {
        self.list()
    }

    async fn send_edit(
        &self,
        parent: &ParentId,
        _owner: &ChatSnapshot,
        edit: &PendingEdit<ChatMessagePayload>,
    ) -> Result<(), AppError> {
        self.record(parent, &edit.payload.message).await
    }
}

#[async_trait]
impl OutboxRemote<NoteKind> for ScriptedRemote {
    async fn list_parents(&self) -> Result<Vec<RemoteParent>, AppError> {
        self.list()
    }

    async fn send_edit(
        &self,
        parent: &ParentId,
        _owner: &NoteSnapshot,
        edit: &PendingEdit<NoteContentPayload>,
    ) -> Result<(), AppError> {
        self.record(parent, &edit.payload.content).await
    }
}

/// Store double that logs every operation and tracks how many run at once.
#[derive(Default)]
pub struct InstrumentedStore {
    inner: MemoryDraftStore,
    log: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    io_delay: Option<Duration>,
    read_gate: Mutex<Option<Arc<Notify>>>,
    fail_writes: AtomicBool,
}

impl InstrumentedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_io_delay(mut self, delay: Duration) -> Self {
        self.io_delay = Some(delay);
        self
    }

    /// Holds the first read until `gate` is notified.
    pub fn with_first_read_gate(self, gate: Arc<Notify>) -> Self {
        self.hold_next_read(gate);
        self
    }

    /// Holds the next read until `gate` is notified.
    pub fn hold_next_read(&self, gate: Arc<Notify>) {
        *self.read_gate.lock().unwrap() = Some(gate);
    }

    /// True while a held read has not started yet.
    pub fn read_hold_armed(&self) -> bool {
        self.read_gate.lock().unwrap().is_some()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &MemoryDraftStore {
        &self.inner
    }

    async fn enter(&self, op: &str, key: &str) {
        self.log.lock().unwrap().push(format!("{op}:{key}"));
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.io_delay {
            sleep(delay).await;
        }
    }

    fn leave(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DraftStore for InstrumentedStore {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, AppError> {
        let gate = self.read_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.enter("get", key).await;
        let result = self.inner.get_raw(key).await;
        self.leave();
        result
    }

    async fn set_raw(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.enter("set", key).await;
        let result = if self.fail_writes.load(Ordering::SeqCst) {
            Err(AppError::Storage("disk full".into()))
        } else {
            self.inner.set_raw(key, value).await
        };
        self.leave();
        result
    }

    async fn remove(&self, key: &str) -> Result<(), AppError> {
        self.enter("remove", key).await;
        let result = self.inner.remove(key).await;
        self.leave();
        result
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl SyncNotifier for RecordingNotifier {
    async fn notify_failure(&self, kind: &str, message: &str) {
        self.messages.lock().unwrap().push(format!("{kind}: {message}"));
    }
}
