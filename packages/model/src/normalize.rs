//! Structural normalizer.
//!
//! Two repair layers, both total:
//!
//! - [`document_from_value`] repairs raw JSON at the load boundary.
//!   Anything that is not a well-shaped tree degrades to well-formed
//!   defaults; malformed input is logged, never rejected.
//! - [`normalize`] repairs an already-typed tree so every block (callouts
//!   included) has at least one child and the document has at least one
//!   block. Idempotent: `normalize(normalize(d)) == normalize(d)`.
//!
//! Nothing downstream may assume well-formedness without having passed
//! through one of these.

use crate::node::{Block, BlockKind, Document, Leaf, Mark, Node};
use serde_json::Value;

/// Repair a typed tree into one satisfying the structural invariants.
pub fn normalize(mut doc: Document) -> Document {
    if doc.blocks.is_empty() {
        doc.blocks.push(Block::paragraph(""));
    }
    for block in &mut doc.blocks {
        normalize_block(block);
    }
    doc
}

fn normalize_block(block: &mut Block) {
    if block.children.is_empty() {
        block.children.push(Node::Leaf(Leaf::empty()));
    }
    for child in &mut block.children {
        if let Node::Block(nested) = child {
            normalize_block(nested);
        }
    }
}

/// Repair raw JSON content into a well-formed document.
///
/// Content that is not a non-empty array becomes the default document.
/// Individual nodes lacking a recognized `type` tag or a `children` array
/// are coerced wholly to a default paragraph; children lacking `text` that
/// are not nested blocks become empty leaves.
pub fn document_from_value(value: &Value) -> Document {
    let blocks = match value.as_array() {
        Some(arr) if !arr.is_empty() => arr.iter().map(block_from_value).collect(),
        Some(_) => {
            tracing::warn!("document content is an empty array, substituting default");
            return Document::empty();
        }
        None => {
            tracing::warn!("document content is not an array, substituting default");
            return Document::empty();
        }
    };
    normalize(Document::new(blocks))
}

fn block_from_value(value: &Value) -> Block {
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .and_then(BlockKind::from_tag);
    let children = value.get("children").and_then(Value::as_array);

    match (kind, children) {
        (Some(kind), Some(children)) => {
            Block::new(kind, children.iter().map(node_from_value).collect())
        }
        _ => {
            tracing::debug!("coercing malformed node to default paragraph");
            Block::paragraph("")
        }
    }
}

fn node_from_value(value: &Value) -> Node {
    let looks_like_block = value.get("type").is_some() && value.get("children").is_some();
    if looks_like_block {
        return Node::Block(block_from_value(value));
    }

    let text = value
        .get("text")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let mut leaf = Leaf::new(text);
    for (mark, key) in [
        (Mark::Bold, "bold"),
        (Mark::Italic, "italic"),
        (Mark::Underline, "underline"),
        (Mark::Code, "code"),
        (Mark::Highlight, "highlight"),
    ] {
        if value.get(key).and_then(Value::as_bool).unwrap_or(false) {
            leaf.marks.insert(mark);
        }
    }
    Node::Leaf(leaf)
}
