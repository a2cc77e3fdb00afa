//! # Secdoc Editor
//!
//! Pure command layer over an editor state.
//!
//! ## Design Principles
//!
//! 1. **Explicit state**: commands are pure functions
//!    `&EditorState -> EditorState`; there is no ambient editor singleton.
//! 2. **Total**: out-of-range selections are clamped and nonsensical
//!    commands degrade to no-ops; no command can fail or panic.
//! 3. **Always normalized**: every command output has passed the model
//!    normalizer, so downstream consumers never see a malformed tree.
//!
//! ## Command Semantics
//!
//! ### ToggleMark
//! - Active means every leaf intersecting the selection carries the mark
//! - Toggling removes from all intersecting leaves, otherwise adds to all
//! - No-op without a non-collapsed selection
//!
//! ### ToggleBlock
//! - Retags every top-level block intersecting the selection
//! - Toggles off (to paragraph) only when all of them already match
//!
//! ### InsertBreak
//! - Splits the caret's block chain into two siblings of the same kind
//! - At the very end of a callout it escapes: a fresh paragraph is
//!   inserted after the callout and the caret moves into it

mod commands;
mod state;

pub use commands::{insert_break, insert_text, toggle_block, toggle_mark, Command};
pub use state::{EditorState, Point, Range};
