//! Editor state and selection addressing.

use secdoc_model::{normalize, Document, Fingerprint};
use serde::{Deserialize, Serialize};

/// Caret position: top-level block index, in-order leaf index within that
/// block's subtree, and byte offset within the leaf's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub block: usize,
    pub leaf: usize,
    pub offset: usize,
}

impl Point {
    pub fn new(block: usize, leaf: usize, offset: usize) -> Self {
        Self {
            block,
            leaf,
            offset,
        }
    }

    /// Pull an out-of-range point back inside the document. Offsets are
    /// also snapped down to a character boundary.
    pub fn clamped(self, doc: &Document) -> Self {
        let Some(last_block) = doc.blocks.len().checked_sub(1) else {
            return Self::new(0, 0, 0);
        };
        let block = self.block.min(last_block);
        let leaves = doc.blocks[block].leaves();
        let leaf = self.leaf.min(leaves.len().saturating_sub(1));
        let text = leaves
            .get(leaf)
            .map(|l| l.text.as_str())
            .unwrap_or_default();
        let mut offset = self.offset.min(text.len());
        while offset > 0 && !text.is_char_boundary(offset) {
            offset -= 1;
        }
        Self {
            block,
            leaf,
            offset,
        }
    }
}

/// Selection: anchor and focus carets, possibly backwards or collapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub anchor: Point,
    pub focus: Point,
}

impl Range {
    pub fn new(anchor: Point, focus: Point) -> Self {
        Self { anchor, focus }
    }

    pub fn collapsed(point: Point) -> Self {
        Self {
            anchor: point,
            focus: point,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// Forward-ordered (start, end) pair, clamped into the document.
    pub fn ordered(&self, doc: &Document) -> (Point, Point) {
        let a = self.anchor.clamped(doc);
        let b = self.focus.clamped(doc);
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }
}

/// Editing state for one open document. Owned exclusively by the editing
/// session; replaced wholesale on load, never partially merged.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorState {
    pub content: Document,
    pub selection: Option<Range>,
    pub dirty: bool,
    pub last_saved_fingerprint: Option<Fingerprint>,
}

impl EditorState {
    /// Fresh state for a brand-new document: one empty paragraph, clean.
    pub fn new_document() -> Self {
        Self::loaded(Document::empty())
    }

    /// State for a freshly loaded document. The content is normalized and
    /// becomes the saved-fingerprint baseline.
    pub fn loaded(content: Document) -> Self {
        let content = normalize(content);
        let baseline = Fingerprint::of(&content);
        Self {
            content,
            selection: None,
            dirty: false,
            last_saved_fingerprint: Some(baseline),
        }
    }

    /// Record a successful save of the current content.
    pub fn mark_saved(&mut self) {
        self.dirty = false;
        self.last_saved_fingerprint = Some(Fingerprint::of(&self.content));
    }
}
