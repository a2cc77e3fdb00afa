//! # Secdoc Score
//!
//! Content-derived security-score heuristic: a pure, deterministic
//! function from a normalized document to an integer in `[0, 100]`.
//!
//! The score rewards substantive security documentation and defeats
//! gaming: callout counts and keyword occurrences are capped so spamming
//! blocks or stuffing keywords hits diminishing returns quickly.
//!
//! Scores are derived views, recomputed on every settled change and on
//! load; they are never persisted.

mod engine;

pub use engine::{score, ScoreSnapshot};
