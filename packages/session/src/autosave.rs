//! Autosave/save state machine.
//!
//! `Idle → Dirty` on the first edit after clean, which arms the autosave
//! deadline. `Dirty → Saving` when the timer fires or a manual save is
//! triggered. Success returns to `Idle`; failure returns to `Dirty` with
//! the timer disarmed, so a failed save is reported, never retried. A
//! fresh edit after a failure is new content and re-arms the timer.

use chrono::{DateTime, Utc};
use tokio::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveState {
    Idle,
    Dirty,
    Saving,
}

#[derive(Debug)]
pub struct AutosaveController {
    interval: Duration,
    state: SaveState,
    deadline: Option<Instant>,
    last_saved: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

impl AutosaveController {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            state: SaveState::Idle,
            deadline: None,
            last_saved: None,
            last_error: None,
        }
    }

    pub fn state(&self) -> SaveState {
        self.state
    }

    pub fn is_saving(&self) -> bool {
        self.state == SaveState::Saving
    }

    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.last_saved
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The pending autosave deadline, if armed.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Record an edit. The first edit after clean (or after a failed save)
    /// arms the deadline; edits while already armed do not extend it.
    pub fn note_edit(&mut self, now: Instant) {
        match self.state {
            SaveState::Idle => {
                self.state = SaveState::Dirty;
                self.deadline = Some(now + self.interval);
            }
            SaveState::Dirty => {
                if self.deadline.is_none() {
                    self.deadline = Some(now + self.interval);
                }
            }
            SaveState::Saving => {}
        }
    }

    /// Enter `Saving`. Cancels any pending deadline.
    pub fn begin_save(&mut self) {
        self.state = SaveState::Saving;
        self.deadline = None;
    }

    pub fn complete_success(&mut self, saved_at: DateTime<Utc>) {
        self.state = SaveState::Idle;
        self.last_saved = Some(saved_at);
        self.last_error = None;
    }

    /// Dirty state is retained; the deadline stays disarmed so nothing
    /// retries automatically.
    pub fn complete_failure(&mut self, error: impl Into<String>) {
        self.state = SaveState::Dirty;
        self.deadline = None;
        self.last_error = Some(error.into());
    }
}
