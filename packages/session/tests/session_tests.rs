//! End-to-end session behavior against an in-memory store, driven on
//! tokio's paused clock so every timer assertion is exact.

use async_trait::async_trait;
use chrono::Utc;
use secdoc_editor::{Command, Point, Range};
use secdoc_session::{
    AllowAll, DocumentSession, DocumentStore, RemoteDocument, SaveGate, SavePayload, SaveReceipt,
    SessionClient, SessionConfig, SessionEvent, StoreError,
};
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration, Instant};

struct MemoryStore {
    remote: RemoteDocument,
    saves: Mutex<Vec<SavePayload>>,
    fail_saves: AtomicBool,
}

impl MemoryStore {
    fn with_content(content: serde_json::Value) -> Arc<Self> {
        Arc::new(Self {
            remote: RemoteDocument {
                title: "Pentest Report".to_string(),
                content,
                updated_at: Utc::now(),
                version: 3,
            },
            saves: Mutex::new(Vec::new()),
            fail_saves: AtomicBool::new(false),
        })
    }

    fn failing(content: serde_json::Value) -> Arc<Self> {
        let store = Self::with_content(content);
        store.fail_saves.store(true, Ordering::SeqCst);
        store
    }

    fn saves(&self) -> Vec<SavePayload> {
        self.saves.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn fetch_document(&self, _id: &str) -> Result<RemoteDocument, StoreError> {
        Ok(self.remote.clone())
    }

    async fn save_document(
        &self,
        _id: &str,
        payload: SavePayload,
    ) -> Result<SaveReceipt, StoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Transient("store unreachable".to_string()));
        }
        let mut saves = self.saves.lock().unwrap();
        saves.push(payload);
        Ok(SaveReceipt {
            updated_at: Utc::now(),
            version: self.remote.version + saves.len() as u64,
        })
    }
}

struct DenyAll;

impl SaveGate for DenyAll {
    fn can_save(&self) -> bool {
        false
    }
}

async fn open_session(
    store: Arc<MemoryStore>,
    gate: Arc<dyn SaveGate>,
) -> (
    SessionClient,
    mpsc::Receiver<SessionEvent>,
    JoinHandle<()>,
) {
    let (client, events, session) =
        DocumentSession::open("doc-1", store, gate, SessionConfig::default())
            .await
            .expect("open session");
    let handle = tokio::spawn(session.run());
    (client, events, handle)
}

fn caret_at_start() -> Option<Range> {
    Some(Range::collapsed(Point::new(0, 0, 0)))
}

async fn expect_no_event(events: &mut mpsc::Receiver<SessionEvent>, window: Duration) {
    tokio::select! {
        event = events.recv() => panic!("unexpected event: {event:?}"),
        _ = sleep(window) => {}
    }
}

#[tokio::test(start_paused = true)]
async fn debounce_coalesces_edit_burst_into_one_change() {
    let store = MemoryStore::with_content(json!([
        { "type": "paragraph", "children": [{ "text": "" }] }
    ]));
    let (client, mut events, _handle) = open_session(store, Arc::new(AllowAll)).await;
    let t0 = Instant::now();

    client.set_selection(caret_at_start()).await;
    client.apply(Command::InsertText("risk ".to_string())).await;
    sleep(Duration::from_millis(100)).await;
    client
        .apply(Command::InsertText("threat".to_string()))
        .await;

    // Exactly one Changed, 300ms after the second edit, carrying both.
    match events.recv().await.expect("changed event") {
        SessionEvent::Changed { content, score } => {
            assert_eq!(t0.elapsed(), Duration::from_millis(400));
            assert_eq!(content.plain_text(), "risk threat");
            assert!(score.value <= 100);
        }
        other => panic!("expected Changed, got {other:?}"),
    }
    expect_no_event(&mut events, Duration::from_millis(500)).await;
}

#[tokio::test(start_paused = true)]
async fn manual_save_flushes_pending_edits_first() {
    let store = MemoryStore::with_content(json!([
        { "type": "paragraph", "children": [{ "text": "" }] }
    ]));
    let (client, mut events, _handle) = open_session(store.clone(), Arc::new(AllowAll)).await;

    client.set_selection(caret_at_start()).await;
    client
        .apply(Command::InsertText("encryption".to_string()))
        .await;

    // Save lands well inside the 300ms debounce window.
    sleep(Duration::from_millis(10)).await;
    client.save().await;

    match events.recv().await.expect("changed event") {
        SessionEvent::Changed { content, .. } => {
            assert_eq!(content.plain_text(), "encryption");
        }
        other => panic!("expected Changed, got {other:?}"),
    }
    assert!(matches!(
        events.recv().await,
        Some(SessionEvent::SaveStarted)
    ));
    match events.recv().await.expect("saved event") {
        SessionEvent::Saved { receipt } => assert_eq!(receipt.version, 4),
        other => panic!("expected Saved, got {other:?}"),
    }

    // The persisted payload reflects the edit, not the pre-debounce state.
    let saves = store.saves();
    assert_eq!(saves.len(), 1);
    assert_eq!(saves[0].content.plain_text(), "encryption");
    assert_eq!(saves[0].title, "Pentest Report");

    let status = client.status().await.expect("status");
    assert!(!status.dirty);
    assert!(status.last_saved.is_some());
    assert_eq!(status.version, 4);
}

#[tokio::test(start_paused = true)]
async fn autosave_fires_at_interval_while_dirty() {
    let store = MemoryStore::with_content(json!([
        { "type": "paragraph", "children": [{ "text": "" }] }
    ]));
    let (client, mut events, _handle) = open_session(store.clone(), Arc::new(AllowAll)).await;
    let t0 = Instant::now();

    client.set_selection(caret_at_start()).await;
    client.apply(Command::InsertText("audit".to_string())).await;

    let status = client.status().await.expect("status");
    assert!(status.dirty, "unsaved-changes guard must see dirty state");

    assert!(matches!(
        events.recv().await,
        Some(SessionEvent::Changed { .. })
    ));
    assert!(matches!(
        events.recv().await,
        Some(SessionEvent::SaveStarted)
    ));
    assert_eq!(t0.elapsed(), Duration::from_secs(60));
    assert!(matches!(events.recv().await, Some(SessionEvent::Saved { .. })));

    assert_eq!(store.saves().len(), 1);
    let status = client.status().await.expect("status");
    assert!(!status.dirty);
}

#[tokio::test(start_paused = true)]
async fn failed_save_keeps_dirty_and_never_retries() {
    let store = MemoryStore::failing(json!([
        { "type": "paragraph", "children": [{ "text": "" }] }
    ]));
    let (client, mut events, _handle) = open_session(store.clone(), Arc::new(AllowAll)).await;

    client.set_selection(caret_at_start()).await;
    client.apply(Command::InsertText("patch".to_string())).await;
    client.save().await;

    assert!(matches!(
        events.recv().await,
        Some(SessionEvent::Changed { .. })
    ));
    assert!(matches!(
        events.recv().await,
        Some(SessionEvent::SaveStarted)
    ));
    match events.recv().await.expect("failure event") {
        SessionEvent::SaveFailed { error } => assert!(error.contains("store unreachable")),
        other => panic!("expected SaveFailed, got {other:?}"),
    }

    let status = client.status().await.expect("status");
    assert!(status.dirty, "dirty state retained after failure");
    assert!(status.last_error.is_some());

    // Two full autosave intervals pass with no retry attempt.
    expect_no_event(&mut events, Duration::from_secs(120)).await;
    assert!(store.saves().is_empty());
}

#[tokio::test(start_paused = true)]
async fn denied_gate_blocks_save_without_touching_store() {
    let store = MemoryStore::with_content(json!([
        { "type": "paragraph", "children": [{ "text": "" }] }
    ]));
    let (client, mut events, _handle) = open_session(store.clone(), Arc::new(DenyAll)).await;

    client.set_selection(caret_at_start()).await;
    client.apply(Command::InsertText("defense".to_string())).await;
    client.save().await;

    assert!(matches!(
        events.recv().await,
        Some(SessionEvent::Changed { .. })
    ));
    match events.recv().await.expect("failure event") {
        SessionEvent::SaveFailed { error } => assert!(error.contains("permission denied")),
        other => panic!("expected SaveFailed, got {other:?}"),
    }
    assert!(store.saves().is_empty());
}

#[tokio::test(start_paused = true)]
async fn malformed_content_loads_as_default_document() {
    let store = MemoryStore::with_content(json!(null));
    let (client, mut events, _handle) = open_session(store, Arc::new(AllowAll)).await;

    let status = client.status().await.expect("status");
    assert_eq!(status.title, "Pentest Report");
    assert_eq!(status.version, 3);
    assert!(!status.dirty);

    // The session is editable: we landed on the single-empty-paragraph
    // default, not a crash.
    client.set_selection(caret_at_start()).await;
    client
        .apply(Command::InsertText("audit trail".to_string()))
        .await;
    match events.recv().await.expect("changed event") {
        SessionEvent::Changed { content, .. } => {
            assert_eq!(content.blocks.len(), 1);
            assert_eq!(content.plain_text(), "audit trail");
        }
        other => panic!("expected Changed, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn title_edit_saves_without_spurious_change_event() {
    let store = MemoryStore::with_content(json!([
        { "type": "paragraph", "children": [{ "text": "" }] }
    ]));
    let (client, mut events, _handle) = open_session(store.clone(), Arc::new(AllowAll)).await;

    client.set_title("Quarterly Audit").await;

    // The debounce settles with an unchanged fingerprint: no Changed.
    expect_no_event(&mut events, Duration::from_secs(1)).await;

    client.save().await;
    assert!(matches!(
        events.recv().await,
        Some(SessionEvent::SaveStarted)
    ));
    assert!(matches!(events.recv().await, Some(SessionEvent::Saved { .. })));

    let saves = store.saves();
    assert_eq!(saves.len(), 1);
    assert_eq!(saves[0].title, "Quarterly Audit");
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_the_session_loop() {
    let store = MemoryStore::with_content(json!([
        { "type": "paragraph", "children": [{ "text": "" }] }
    ]));
    let (client, _events, handle) = open_session(store, Arc::new(AllowAll)).await;

    client.shutdown().await;
    handle.await.expect("session task");
    assert!(client.status().await.is_none());
}
