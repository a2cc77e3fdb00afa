//! Debounced change detection.
//!
//! The tracker is the single source of truth for the pending flush: one
//! optional deadline, re-armed on every edit, plus the fingerprint of the
//! last content the host was notified about. Settling clears the deadline
//! and reports a fingerprint only when the content genuinely differs, so
//! hosts never hear about no-op edit bursts.

use secdoc_model::{Document, Fingerprint};
use tokio::time::{Duration, Instant};

#[derive(Debug)]
pub struct DebounceTracker {
    window: Duration,
    deadline: Option<Instant>,
    last_notified: Option<Fingerprint>,
}

impl DebounceTracker {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
            last_notified: None,
        }
    }

    /// Seed the baseline so a load doesn't count as a change.
    pub fn with_baseline(window: Duration, baseline: Fingerprint) -> Self {
        Self {
            window,
            deadline: None,
            last_notified: Some(baseline),
        }
    }

    /// (Re)arm the window from `now`. Called on every edit.
    pub fn note_edit(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    /// The pending flush deadline, if a flush is pending.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Flush: clear the timer, fingerprint the content, and return the new
    /// fingerprint only if it differs from the last notification.
    pub fn settle(&mut self, content: &Document) -> Option<Fingerprint> {
        self.deadline = None;
        let fp = Fingerprint::of(content);
        if self.last_notified == Some(fp) {
            return None;
        }
        self.last_notified = Some(fp);
        Some(fp)
    }
}
