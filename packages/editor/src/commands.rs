//! Editing commands.
//!
//! Each command is a pure, total operation: it takes the current state by
//! reference and returns the next state with normalized content. Commands
//! that find nothing sensible to do (no selection, collapsed mark toggle)
//! return the state unchanged.

use crate::state::{EditorState, Point, Range};
use secdoc_model::{normalize, Block, BlockKind, Document, Leaf, Mark, Node};
use serde::{Deserialize, Serialize};

/// Semantic editing operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Toggle a character mark across the selection
    ToggleMark(Mark),

    /// Toggle the block type of every block intersecting the selection
    ToggleBlock(BlockKind),

    /// Split at the caret, with callout-escape at a callout's end
    InsertBreak,

    /// Type text at the caret
    InsertText(String),
}

impl Command {
    pub fn apply(&self, state: &EditorState) -> EditorState {
        match self {
            Command::ToggleMark(mark) => toggle_mark(state, *mark),
            Command::ToggleBlock(kind) => toggle_block(state, *kind),
            Command::InsertBreak => insert_break(state),
            Command::InsertText(text) => insert_text(state, text),
        }
    }
}

/// Toggle a mark across the leaves intersecting the selection.
///
/// The mark counts as active only when every intersecting leaf carries it;
/// an active mark is removed everywhere, otherwise it is added everywhere.
/// Marks operate at leaf granularity.
pub fn toggle_mark(state: &EditorState, mark: Mark) -> EditorState {
    let Some(range) = state.selection else {
        return state.clone();
    };
    if range.is_collapsed() {
        return state.clone();
    }
    let (start, end) = range.ordered(&state.content);

    let mut any = false;
    let mut all = true;
    for_each_selected_leaf(&state.content, start, end, |leaf| {
        any = true;
        all &= leaf.marks.contains(mark);
    });
    if !any {
        return state.clone();
    }
    let adding = !all;

    let mut next = state.clone();
    for_each_selected_leaf_mut(&mut next.content, start, end, |leaf| {
        leaf.marks.set(mark, adding);
    });
    next.content = normalize(next.content);
    next.dirty = true;
    next
}

fn for_each_selected_leaf(doc: &Document, start: Point, end: Point, mut f: impl FnMut(&Leaf)) {
    for (bi, block) in doc.blocks.iter().enumerate() {
        if bi < start.block || bi > end.block {
            continue;
        }
        let leaves = block.leaves();
        let lo = if bi == start.block { start.leaf } else { 0 };
        let hi = if bi == end.block {
            end.leaf.min(leaves.len().saturating_sub(1))
        } else {
            leaves.len().saturating_sub(1)
        };
        for leaf in leaves.into_iter().skip(lo).take(hi.saturating_sub(lo) + 1) {
            f(leaf);
        }
    }
}

fn for_each_selected_leaf_mut(
    doc: &mut Document,
    start: Point,
    end: Point,
    mut f: impl FnMut(&mut Leaf),
) {
    for (bi, block) in doc.blocks.iter_mut().enumerate() {
        if bi < start.block || bi > end.block {
            continue;
        }
        let leaves = block.leaves_mut();
        let count = leaves.len();
        let lo = if bi == start.block { start.leaf } else { 0 };
        let hi = if bi == end.block {
            end.leaf.min(count.saturating_sub(1))
        } else {
            count.saturating_sub(1)
        };
        for leaf in leaves.into_iter().skip(lo).take(hi.saturating_sub(lo) + 1) {
            f(leaf);
        }
    }
}

/// Retag every top-level block intersecting the selection.
///
/// Toggles off (back to paragraph) only when all intersected blocks
/// already carry the target type; a mixed selection is set uniformly to
/// the target type.
pub fn toggle_block(state: &EditorState, kind: BlockKind) -> EditorState {
    let Some(range) = state.selection else {
        return state.clone();
    };
    let (start, end) = range.ordered(&state.content);

    let all_match = state.content.blocks[start.block..=end.block]
        .iter()
        .all(|b| b.kind == kind);
    let target = if all_match {
        BlockKind::Paragraph
    } else {
        kind
    };

    let mut next = state.clone();
    let mut changed = false;
    for block in &mut next.content.blocks[start.block..=end.block] {
        changed |= block.kind != target;
        block.kind = target;
    }
    if !changed {
        return state.clone();
    }
    next.content = normalize(next.content);
    next.dirty = true;
    next
}

/// Line break at the caret.
///
/// The containing block chain splits into two siblings of the same kind
/// and the caret moves to the start of the second. A caret at the very end
/// of a callout block instead escapes it: a fresh empty paragraph is
/// inserted after the callout and selected, leaving the callout untouched.
pub fn insert_break(state: &EditorState) -> EditorState {
    let Some(range) = state.selection else {
        return state.clone();
    };
    if !range.is_collapsed() {
        return state.clone();
    }
    let caret = range.anchor.clamped(&state.content);

    let mut next = state.clone();
    let block = &next.content.blocks[caret.block];
    let leaves = block.leaves();
    let at_end = caret.leaf + 1 == leaves.len()
        && caret.offset == leaves[caret.leaf].text.len();

    if block.kind.is_callout() && at_end {
        next.content
            .blocks
            .insert(caret.block + 1, Block::paragraph(""));
    } else {
        let (before, after) = split_block(block, caret.leaf, caret.offset);
        next.content.blocks[caret.block] = before;
        next.content.blocks.insert(caret.block + 1, after);
    }
    next.selection = Some(Range::collapsed(Point::new(caret.block + 1, 0, 0)));
    next.content = normalize(next.content);
    next.dirty = true;
    next
}

/// Split a block at a flattened leaf position into (before, after), both
/// keeping the block's kind. Splitting recurses through nested blocks, so
/// a list splits into two lists at the containing item.
fn split_block(block: &Block, leaf: usize, offset: usize) -> (Block, Block) {
    let mut before = Vec::new();
    let mut after = Vec::new();
    let mut seen = 0usize;
    let mut split = false;

    for child in &block.children {
        if split {
            after.push(child.clone());
            continue;
        }
        match child {
            Node::Leaf(l) => {
                if seen == leaf {
                    let at = l.text.len().min(offset);
                    let (head, tail) = l.text.split_at(at);
                    before.push(Node::Leaf(Leaf {
                        text: head.to_string(),
                        marks: l.marks,
                    }));
                    after.push(Node::Leaf(Leaf {
                        text: tail.to_string(),
                        marks: l.marks,
                    }));
                    split = true;
                } else {
                    before.push(child.clone());
                }
                seen += 1;
            }
            Node::Block(nested) => {
                let width = nested.leaves().len();
                if seen + width > leaf {
                    let (head, tail) = split_block(nested, leaf - seen, offset);
                    before.push(Node::Block(head));
                    after.push(Node::Block(tail));
                    split = true;
                } else {
                    before.push(child.clone());
                }
                seen += width;
            }
        }
    }

    (
        Block::new(block.kind, before),
        Block::new(block.kind, after),
    )
}

/// Type text at a collapsed caret and advance it.
pub fn insert_text(state: &EditorState, text: &str) -> EditorState {
    let Some(range) = state.selection else {
        return state.clone();
    };
    if !range.is_collapsed() || text.is_empty() {
        return state.clone();
    }
    let caret = range.anchor.clamped(&state.content);

    let mut next = state.clone();
    {
        let mut leaves = next.content.blocks[caret.block].leaves_mut();
        if let Some(leaf) = leaves.get_mut(caret.leaf) {
            leaf.text.insert_str(caret.offset, text);
        }
    }
    next.content = normalize(next.content);
    next.selection = Some(Range::collapsed(Point::new(
        caret.block,
        caret.leaf,
        caret.offset + text.len(),
    )));
    next.dirty = true;
    next
}
