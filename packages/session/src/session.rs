//! Document editing session.
//!
//! One session per open document. The session is an actor: the host talks
//! to it through a [`SessionClient`] command channel and listens on an
//! event channel, while the actor owns the editor state, the debounce
//! tracker, and the autosave controller, multiplexing commands and timer
//! deadlines in a single `select!` loop.
//!
//! All edits serialize through this loop, and the persistence call is
//! awaited inline, so there is exactly one writer and saves never overlap.
//! Dropping the session (or the last client) cancels every pending
//! deadline with it.

use crate::autosave::AutosaveController;
use crate::debounce::DebounceTracker;
use crate::store::{DocumentStore, SaveGate, SavePayload, SaveReceipt, StoreError};
use chrono::{DateTime, Utc};
use secdoc_editor::{Command, EditorState, Range};
use secdoc_model::{document_from_value, Document};
use secdoc_score::ScoreSnapshot;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep_until, Duration, Instant};

const CHANNEL_CAPACITY: usize = 100;

/// Timer configuration for one session.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    pub debounce_window: Duration,
    pub autosave_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debounce_window: Duration::from_millis(300),
            autosave_interval: Duration::from_secs(60),
        }
    }
}

#[derive(Debug)]
enum SessionCommand {
    Apply(Command),
    SetSelection(Option<Range>),
    SetTitle(String),
    Save,
    Status(oneshot::Sender<SessionStatus>),
    Shutdown,
}

/// Notifications the host receives from a session.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A settled, de-duplicated edit: fired only when the content
    /// fingerprint actually changed.
    Changed {
        content: Document,
        score: ScoreSnapshot,
    },
    SaveStarted,
    Saved { receipt: SaveReceipt },
    SaveFailed { error: String },
}

/// Point-in-time answers to the host's status queries (save indicator,
/// unsaved-changes navigation guard, title bar).
#[derive(Debug, Clone)]
pub struct SessionStatus {
    pub title: String,
    pub dirty: bool,
    pub is_saving: bool,
    pub last_saved: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub version: u64,
    pub score: u8,
}

/// Cloneable handle the host uses to talk to a running session.
#[derive(Debug, Clone)]
pub struct SessionClient {
    tx: mpsc::Sender<SessionCommand>,
}

impl SessionClient {
    pub async fn apply(&self, command: Command) {
        let _ = self.tx.send(SessionCommand::Apply(command)).await;
    }

    pub async fn set_selection(&self, selection: Option<Range>) {
        let _ = self.tx.send(SessionCommand::SetSelection(selection)).await;
    }

    pub async fn set_title(&self, title: impl Into<String>) {
        let _ = self.tx.send(SessionCommand::SetTitle(title.into())).await;
    }

    /// Manual save: flushes the change pipeline, then persists.
    pub async fn save(&self) {
        let _ = self.tx.send(SessionCommand::Save).await;
    }

    /// `None` once the session has shut down.
    pub async fn status(&self) -> Option<SessionStatus> {
        let (reply, answer) = oneshot::channel();
        if self
            .tx
            .send(SessionCommand::Status(reply))
            .await
            .is_err()
        {
            return None;
        }
        answer.await.ok()
    }

    pub async fn shutdown(&self) {
        let _ = self.tx.send(SessionCommand::Shutdown).await;
    }
}

enum Wake {
    Command(Option<SessionCommand>),
    DebounceDue,
    AutosaveDue,
}

/// The editing-session actor.
pub struct DocumentSession {
    id: String,
    title: String,
    state: EditorState,
    score: ScoreSnapshot,
    version: u64,
    debounce: DebounceTracker,
    autosave: AutosaveController,
    store: Arc<dyn DocumentStore>,
    gate: Arc<dyn SaveGate>,
    commands: mpsc::Receiver<SessionCommand>,
    events: mpsc::Sender<SessionEvent>,
}

impl DocumentSession {
    /// Open an existing document. Malformed stored content is repaired to
    /// a well-formed tree (worst case the default empty document); only
    /// the fetch itself can fail.
    pub async fn open(
        id: &str,
        store: Arc<dyn DocumentStore>,
        gate: Arc<dyn SaveGate>,
        config: SessionConfig,
    ) -> Result<(SessionClient, mpsc::Receiver<SessionEvent>, Self), StoreError> {
        let remote = store.fetch_document(id).await?;
        let content = document_from_value(&remote.content);
        Ok(Self::assemble(
            id,
            remote.title,
            content,
            remote.version,
            store,
            gate,
            config,
        ))
    }

    /// Start a session on a brand-new document: a single empty paragraph,
    /// nothing fetched.
    pub fn new_document(
        id: &str,
        title: impl Into<String>,
        store: Arc<dyn DocumentStore>,
        gate: Arc<dyn SaveGate>,
        config: SessionConfig,
    ) -> (SessionClient, mpsc::Receiver<SessionEvent>, Self) {
        Self::assemble(id, title.into(), Document::empty(), 0, store, gate, config)
    }

    fn assemble(
        id: &str,
        title: String,
        content: Document,
        version: u64,
        store: Arc<dyn DocumentStore>,
        gate: Arc<dyn SaveGate>,
        config: SessionConfig,
    ) -> (SessionClient, mpsc::Receiver<SessionEvent>, Self) {
        let state = EditorState::loaded(content);
        let score = ScoreSnapshot::compute(&state.content);
        let debounce = match state.last_saved_fingerprint {
            Some(baseline) => DebounceTracker::with_baseline(config.debounce_window, baseline),
            None => DebounceTracker::new(config.debounce_window),
        };
        let (tx, commands) = mpsc::channel(CHANNEL_CAPACITY);
        let (events, events_rx) = mpsc::channel(CHANNEL_CAPACITY);

        let session = Self {
            id: id.to_string(),
            title,
            state,
            score,
            version,
            debounce,
            autosave: AutosaveController::new(config.autosave_interval),
            store,
            gate,
            commands,
            events,
        };
        (SessionClient { tx }, events_rx, session)
    }

    /// Drive the session until shutdown or until every client is dropped.
    pub async fn run(mut self) {
        tracing::debug!(id = %self.id, "session started");
        loop {
            let debounce_at = self.debounce.deadline();
            let autosave_at = self.autosave.deadline();

            let wake = tokio::select! {
                cmd = self.commands.recv() => Wake::Command(cmd),
                _ = sleep_until(debounce_at.unwrap_or_else(Instant::now)),
                    if debounce_at.is_some() => Wake::DebounceDue,
                _ = sleep_until(autosave_at.unwrap_or_else(Instant::now)),
                    if autosave_at.is_some() => Wake::AutosaveDue,
            };

            match wake {
                Wake::Command(Some(SessionCommand::Apply(command))) => {
                    self.handle_edit(command);
                }
                Wake::Command(Some(SessionCommand::SetSelection(selection))) => {
                    self.state.selection = selection;
                }
                Wake::Command(Some(SessionCommand::SetTitle(title))) => {
                    self.set_title(title);
                }
                Wake::Command(Some(SessionCommand::Save)) => {
                    self.manual_save().await;
                }
                Wake::Command(Some(SessionCommand::Status(reply))) => {
                    let _ = reply.send(self.status());
                }
                Wake::Command(Some(SessionCommand::Shutdown)) | Wake::Command(None) => break,
                Wake::DebounceDue => self.flush_changes().await,
                Wake::AutosaveDue => self.save().await,
            }
        }
        tracing::debug!(id = %self.id, "session ended");
    }

    /// Apply a command synchronously; arm the timers only when content
    /// actually changed.
    fn handle_edit(&mut self, command: Command) {
        let next = command.apply(&self.state);
        let changed = next.content != self.state.content;
        self.state = next;
        if changed {
            let now = Instant::now();
            self.debounce.note_edit(now);
            self.autosave.note_edit(now);
        }
    }

    /// Title edits dirty the session and arm the timers like any edit;
    /// the fingerprint compare keeps them from firing a spurious
    /// `Changed` (title is not content).
    fn set_title(&mut self, title: String) {
        if title == self.title {
            return;
        }
        self.title = title;
        self.state.dirty = true;
        let now = Instant::now();
        self.debounce.note_edit(now);
        self.autosave.note_edit(now);
    }

    /// Debounce settlement: fingerprint the content and notify the host
    /// only on a genuine change.
    async fn flush_changes(&mut self) {
        if self.debounce.settle(&self.state.content).is_some() {
            self.score = ScoreSnapshot::compute(&self.state.content);
            tracing::debug!(id = %self.id, score = self.score.value, "content settled");
            let _ = self
                .events
                .send(SessionEvent::Changed {
                    content: self.state.content.clone(),
                    score: self.score,
                })
                .await;
        }
    }

    /// Manual save: flush the pipeline first so a save triggered inside
    /// the debounce window never persists stale content.
    async fn manual_save(&mut self) {
        self.flush_changes().await;
        self.save().await;
    }

    async fn save(&mut self) {
        if !self.gate.can_save() {
            tracing::warn!(id = %self.id, "save blocked by identity gate");
            self.autosave.complete_failure("permission denied");
            let _ = self
                .events
                .send(SessionEvent::SaveFailed {
                    error: StoreError::PermissionDenied.to_string(),
                })
                .await;
            return;
        }

        self.autosave.begin_save();
        let _ = self.events.send(SessionEvent::SaveStarted).await;

        let payload = SavePayload {
            title: self.title.clone(),
            content: self.state.content.clone(),
        };
        match self.store.save_document(&self.id, payload).await {
            Ok(receipt) => {
                self.version = receipt.version;
                self.state.mark_saved();
                self.autosave.complete_success(receipt.updated_at);
                tracing::info!(id = %self.id, version = receipt.version, "document saved");
                let _ = self.events.send(SessionEvent::Saved { receipt }).await;
            }
            Err(error) => {
                tracing::warn!(id = %self.id, %error, "save failed, dirty state retained");
                self.autosave.complete_failure(error.to_string());
                let _ = self
                    .events
                    .send(SessionEvent::SaveFailed {
                        error: error.to_string(),
                    })
                    .await;
            }
        }
    }

    fn status(&self) -> SessionStatus {
        SessionStatus {
            title: self.title.clone(),
            dirty: self.state.dirty,
            is_saving: self.autosave.is_saving(),
            last_saved: self.autosave.last_saved(),
            last_error: self.autosave.last_error().map(str::to_string),
            version: self.version,
            score: self.score.value,
        }
    }
}
