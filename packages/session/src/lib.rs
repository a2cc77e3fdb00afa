//! # Secdoc Session
//!
//! The debounced change pipeline and autosave controller for one open
//! document, wired to external persistence and identity collaborators.
//!
//! ## Architecture
//!
//! ```text
//! host UI ──commands──▶ ┌──────────────────────────────┐
//!                       │ DocumentSession (actor)      │
//!                       │  - EditorState (synchronous) │
//!                       │  - DebounceTracker (300ms)   │
//!                       │  - AutosaveController (60s)  │
//!                       └──────────────┬───────────────┘
//!        ◀──events── Changed / Saved / SaveFailed
//!                                      │
//!                           DocumentStore (async trait)
//! ```
//!
//! ## Core Principles
//!
//! 1. **Synchronous edits, debounced notification**: local state updates on
//!    every command; hosts hear about content only once it settles and the
//!    fingerprint actually changed.
//! 2. **Single writer, single flight**: the actor serializes all edits and
//!    awaits saves inline, so saves never overlap and whatever content a
//!    flush sees is exactly what gets persisted.
//! 3. **Report, don't retry**: a failed save surfaces an error and retains
//!    dirty state; nothing retries behind the user's back.

mod autosave;
mod debounce;
mod session;
mod store;

pub use autosave::{AutosaveController, SaveState};
pub use debounce::DebounceTracker;
pub use session::{
    DocumentSession, SessionClient, SessionConfig, SessionEvent, SessionStatus,
};
pub use store::{
    AllowAll, DocumentStore, RemoteDocument, SaveGate, SavePayload, SaveReceipt, StoreError,
};
