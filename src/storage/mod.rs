//! Storage module for persisting harvest state
//!
//! This module handles every on-disk document the harvester owns:
//! - Accumulated campaign subtrees and the resume cursor (checkpoint)
//! - The linked/classified entry list
//! - Raw per-ad insights
//!
//! All documents are JSON and are replaced atomically on write.

mod json;
mod traits;

pub use json::{read_json_or_default, remove_if_exists, write_json_atomic, JsonFileStore};
pub use traits::{Checkpoint, CheckpointStore, StorageError, StorageResult};

use crate::config::OutputConfig;

/// Opens the checkpoint store described by the output configuration
pub fn open_checkpoint_store(output: &OutputConfig) -> JsonFileStore {
    JsonFileStore::new(&output.results_path, &output.cursor_path)
}
