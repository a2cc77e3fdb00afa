//! Content fingerprinting for change detection.
//!
//! The fingerprint is a CRC32 over the structural `Hash` of the tree, so
//! it depends only on the tree's shape and text, never on serialization
//! field ordering. Equal trees always fingerprint equal; the change
//! pipeline uses that to suppress no-op notifications.

use crate::node::Document;
use std::hash::{Hash, Hasher};

/// Canonical structural fingerprint of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprint(u32);

impl Fingerprint {
    pub fn of(doc: &Document) -> Self {
        let mut hasher = crc32fast::Hasher::new();
        doc.hash(&mut hasher);
        Fingerprint(Hasher::finish(&hasher) as u32)
    }

    pub fn value(self) -> u32 {
        self.0
    }
}
