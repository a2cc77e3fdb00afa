//! # Secdoc Content Model
//!
//! The tagged content tree for security documents, its structural
//! invariants, the normalizer that enforces them, and the content
//! fingerprint used for change detection.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ model: content tree + invariants            │
//! │  - Block/Leaf tagged tree (wire format)     │
//! │  - Normalizer: repair, never reject         │
//! │  - Fingerprint: structural change detection │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: commands over EditorState           │
//! │ score: derived 0-100 heuristic              │
//! │ session: debounce + autosave pipeline       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **The tree is the source of truth**: fingerprints and scores are
//!    derived views, never persisted.
//! 2. **Repair, never reject**: any value claiming to be a document is
//!    normalized into a well-formed one; downstream consumers may assume
//!    well-formedness only after normalization.
//! 3. **Wire-verbatim**: documents serialize exactly as the persisted
//!    layout (a JSON array of `{type, children}` blocks with
//!    `{text, ...marks}` leaves).

mod fingerprint;
mod node;
mod normalize;

pub use fingerprint::Fingerprint;
pub use node::{Block, BlockKind, Document, Leaf, Mark, MarkSet, Node};
pub use normalize::{document_from_value, normalize};
