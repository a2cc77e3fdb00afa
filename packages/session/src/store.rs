//! External collaborator interfaces.
//!
//! The persistence store owns `version` and `updated_at`; this core never
//! increments them. Content crosses the boundary verbatim as the model
//! tree: raw on the way in (the normalizer repairs it), typed on the way
//! out.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secdoc_model::Document;
use thiserror::Error;

/// Failure kinds the persistence collaborator can report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(String),

    #[error("permission denied")]
    PermissionDenied,

    #[error("transient i/o failure: {0}")]
    Transient(String),
}

/// A fetched document, content still raw and untrusted.
#[derive(Debug, Clone)]
pub struct RemoteDocument {
    pub title: String,
    pub content: serde_json::Value,
    pub updated_at: DateTime<Utc>,
    pub version: u64,
}

/// What a save sends to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct SavePayload {
    pub title: String,
    pub content: Document,
}

/// What the store reports back after a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReceipt {
    pub updated_at: DateTime<Utc>,
    pub version: u64,
}

/// Persistence collaborator.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn fetch_document(&self, id: &str) -> Result<RemoteDocument, StoreError>;

    async fn save_document(&self, id: &str, payload: SavePayload)
        -> Result<SaveReceipt, StoreError>;
}

/// Identity collaborator: the single gate this core consults. No identity
/// logic lives here.
pub trait SaveGate: Send + Sync {
    fn can_save(&self) -> bool;
}

/// Gate for hosts without role checks.
pub struct AllowAll;

impl SaveGate for AllowAll {
    fn can_save(&self) -> bool {
        true
    }
}
