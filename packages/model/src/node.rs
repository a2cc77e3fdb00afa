//! Content tree node types.
//!
//! The wire format matches the persisted layout exactly: a document is a
//! JSON array of block objects `{"type": "...", "children": [...]}` whose
//! leaves are `{"text": "...", "bold": true, ...}` with false mark flags
//! omitted.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Block type tag. The wire representation is the kebab-case tag string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockKind {
    Paragraph,
    HeadingOne,
    HeadingTwo,
    HeadingThree,
    BulletedList,
    NumberedList,
    ListItem,
    BlockQuote,
    CodeBlock,
    SecurityNote,
    Vulnerability,
    Compliance,
    Warning,
}

impl BlockKind {
    /// The four callout kinds, rendered bordered and guaranteed non-empty
    /// after normalization.
    pub const CALLOUTS: [BlockKind; 4] = [
        BlockKind::SecurityNote,
        BlockKind::Vulnerability,
        BlockKind::Compliance,
        BlockKind::Warning,
    ];

    pub fn is_callout(self) -> bool {
        matches!(
            self,
            BlockKind::SecurityNote
                | BlockKind::Vulnerability
                | BlockKind::Compliance
                | BlockKind::Warning
        )
    }

    /// Parse a wire tag. Unrecognized tags return `None`; the normalizer
    /// coerces those nodes to a default paragraph.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let kind = match tag {
            "paragraph" => BlockKind::Paragraph,
            "heading-one" => BlockKind::HeadingOne,
            "heading-two" => BlockKind::HeadingTwo,
            "heading-three" => BlockKind::HeadingThree,
            "bulleted-list" => BlockKind::BulletedList,
            "numbered-list" => BlockKind::NumberedList,
            "list-item" => BlockKind::ListItem,
            "block-quote" => BlockKind::BlockQuote,
            "code-block" => BlockKind::CodeBlock,
            "security-note" => BlockKind::SecurityNote,
            "vulnerability" => BlockKind::Vulnerability,
            "compliance" => BlockKind::Compliance,
            "warning" => BlockKind::Warning,
            _ => return None,
        };
        Some(kind)
    }
}

/// A single character-level formatting flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    Bold,
    Italic,
    Underline,
    Code,
    Highlight,
}

/// Independent boolean mark flags on a leaf. Not mutually exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarkSet {
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub underline: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub code: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub highlight: bool,
}

fn is_false(v: &bool) -> bool {
    !*v
}

impl MarkSet {
    pub fn contains(&self, mark: Mark) -> bool {
        match mark {
            Mark::Bold => self.bold,
            Mark::Italic => self.italic,
            Mark::Underline => self.underline,
            Mark::Code => self.code,
            Mark::Highlight => self.highlight,
        }
    }

    pub fn insert(&mut self, mark: Mark) {
        self.set(mark, true);
    }

    pub fn remove(&mut self, mark: Mark) {
        self.set(mark, false);
    }

    pub fn set(&mut self, mark: Mark, on: bool) {
        match mark {
            Mark::Bold => self.bold = on,
            Mark::Italic => self.italic = on,
            Mark::Underline => self.underline = on,
            Mark::Code => self.code = on,
            Mark::Highlight => self.highlight = on,
        }
    }
}

/// Text leaf: literal text plus active marks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Leaf {
    #[serde(default)]
    pub text: String,
    #[serde(flatten)]
    pub marks: MarkSet,
}

impl Leaf {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: MarkSet::default(),
        }
    }

    pub fn empty() -> Self {
        Self::new("")
    }
}

/// Tree node: either a nested block or a text leaf.
///
/// Untagged on the wire: an object carrying `type` and `children`
/// deserializes as a block, an object carrying `text` as a leaf.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Block(Block),
    Leaf(Leaf),
}

/// Block node: a type tag and ordered children.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Block {
    #[serde(rename = "type")]
    pub kind: BlockKind,
    pub children: Vec<Node>,
}

impl Block {
    pub fn new(kind: BlockKind, children: Vec<Node>) -> Self {
        Self { kind, children }
    }

    /// A paragraph holding a single unmarked leaf.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(BlockKind::Paragraph, vec![Node::Leaf(Leaf::new(text))])
    }

    /// In-order text leaves of this block's subtree.
    pub fn leaves(&self) -> Vec<&Leaf> {
        let mut out = Vec::new();
        collect_leaves(&self.children, &mut out);
        out
    }

    /// In-order mutable text leaves of this block's subtree.
    pub fn leaves_mut(&mut self) -> Vec<&mut Leaf> {
        let mut out = Vec::new();
        collect_leaves_mut(&mut self.children, &mut out);
        out
    }

    /// Concatenated leaf text of this block's subtree.
    pub fn text(&self) -> String {
        self.leaves().iter().map(|l| l.text.as_str()).collect()
    }

    fn collect_kinds(&self, kinds: &mut HashSet<BlockKind>) {
        kinds.insert(self.kind);
        for child in &self.children {
            if let Node::Block(block) = child {
                block.collect_kinds(kinds);
            }
        }
    }

    fn count_kind(&self, kind: BlockKind) -> usize {
        let mut count = usize::from(self.kind == kind);
        for child in &self.children {
            if let Node::Block(block) = child {
                count += block.count_kind(kind);
            }
        }
        count
    }
}

fn collect_leaves<'a>(children: &'a [Node], out: &mut Vec<&'a Leaf>) {
    for child in children {
        match child {
            Node::Leaf(leaf) => out.push(leaf),
            Node::Block(block) => collect_leaves(&block.children, out),
        }
    }
}

fn collect_leaves_mut<'a>(children: &'a mut [Node], out: &mut Vec<&'a mut Leaf>) {
    for child in children {
        match child {
            Node::Leaf(leaf) => out.push(leaf),
            Node::Block(block) => collect_leaves_mut(&mut block.children, out),
        }
    }
}

/// A document: ordered sequence of top-level blocks.
///
/// Serializes transparently as the bare array, matching the persisted
/// layout. Non-emptiness is an invariant enforced by the normalizer, not
/// the type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    /// The default document: a single empty paragraph.
    pub fn empty() -> Self {
        Self::new(vec![Block::paragraph("")])
    }

    /// Canonical serialized text: leaf text in order, blocks separated by
    /// newlines. This is the text the score engine scans.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(|b| b.text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Distinct block kinds present anywhere in the tree.
    pub fn block_kinds(&self) -> HashSet<BlockKind> {
        let mut kinds = HashSet::new();
        for block in &self.blocks {
            block.collect_kinds(&mut kinds);
        }
        kinds
    }

    /// Occurrences of a block kind anywhere in the tree.
    pub fn count_blocks(&self, kind: BlockKind) -> usize {
        self.blocks.iter().map(|b| b.count_kind(kind)).sum()
    }
}
