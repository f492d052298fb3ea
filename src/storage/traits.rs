//! Storage traits and error types
//!
//! This module defines the checkpoint interface used by the walker and the
//! associated error types.

use crate::model::{CampaignRecord, ResumeCursor};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Malformed JSON in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },

    #[error("Failed to replace {path}: {source}")]
    Persist {
        path: String,
        source: tempfile::PersistError,
    },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Everything a harvest run needs to resume
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Checkpoint {
    /// Committed campaign subtrees, in commit order
    pub results: Vec<CampaignRecord>,

    pub cursor: ResumeCursor,
}

/// Trait for checkpoint backends
///
/// `load` on a store that was never written returns an empty checkpoint.
/// `save` must leave either the previous or the new state readable, never
/// a partial document.
pub trait CheckpointStore {
    /// Reads accumulated results and the resume cursor
    fn load(&self) -> StorageResult<Checkpoint>;

    /// Replaces accumulated results and the resume cursor
    fn save(&mut self, results: &[CampaignRecord], cursor: &ResumeCursor) -> StorageResult<()>;

    /// Removes all persisted state (used by `--fresh`)
    fn clear(&mut self) -> StorageResult<()>;
}
