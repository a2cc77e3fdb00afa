//! Score computation.

use chrono::{DateTime, Utc};
use secdoc_model::{BlockKind, Document};

/// Per-occurrence weights for the four callout kinds.
const CALLOUT_WEIGHTS: [(BlockKind, u32); 4] = [
    (BlockKind::SecurityNote, 8),
    (BlockKind::Vulnerability, 10),
    (BlockKind::Compliance, 12),
    (BlockKind::Warning, 6),
];

/// Occurrences of each callout kind counted toward the score, at most.
const CALLOUT_CAP: u32 = 10;

/// Security vocabulary with per-occurrence weights. Matched as lowercase
/// substrings, so stems cover their derived forms ("protect" counts
/// "protection").
const KEYWORD_WEIGHTS: [(&str, u32); 19] = [
    ("security", 2),
    ("vulnerability", 3),
    ("encryption", 5),
    ("mitigation", 4),
    ("authentication", 4),
    ("authorization", 4),
    ("audit", 3),
    ("protect", 1),
    ("defense", 2),
    ("incident", 3),
    ("response", 1),
    ("firewall", 2),
    ("monitoring", 2),
    ("patch", 3),
    ("risk", 2),
    ("threat", 3),
    ("compliance", 2),
    ("policy", 2),
    ("control", 2),
];

/// Occurrences of each keyword counted toward the score, at most.
const KEYWORD_CAP: u32 = 5;

const LENGTH_DIVISOR: u32 = 500;
const LENGTH_BONUS_CAP: u32 = 15;
const VARIETY_BONUS_PER_KIND: u32 = 3;

/// Score a document: callout counts + keyword scan + length bonus +
/// structural variety, clamped into `[0, 100]`.
pub fn score(doc: &Document) -> u8 {
    let callouts: u32 = CALLOUT_WEIGHTS
        .iter()
        .map(|&(kind, weight)| (doc.count_blocks(kind) as u32).min(CALLOUT_CAP) * weight)
        .sum();

    let text = doc.plain_text().to_lowercase();
    let keywords: u32 = KEYWORD_WEIGHTS
        .iter()
        .map(|&(term, weight)| (text.matches(term).count() as u32).min(KEYWORD_CAP) * weight)
        .sum();

    let length = (text.len() as u32 / LENGTH_DIVISOR).min(LENGTH_BONUS_CAP);
    let variety = doc.block_kinds().len() as u32 * VARIETY_BONUS_PER_KIND;

    (callouts + keywords + length + variety).min(100) as u8
}

/// A computed score plus when it was computed. Derived, never
/// authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreSnapshot {
    pub value: u8,
    pub computed_at: DateTime<Utc>,
}

impl ScoreSnapshot {
    pub fn compute(doc: &Document) -> Self {
        Self {
            value: score(doc),
            computed_at: Utc::now(),
        }
    }
}
