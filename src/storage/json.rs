//! JSON document storage with atomic replacement
//!
//! Every write goes to a temporary file in the target's directory, is
//! flushed and synced, then renamed over the target. Readers see either
//! the old document or the new one.

use crate::model::{CampaignRecord, ResumeCursor};
use crate::storage::traits::{Checkpoint, CheckpointStore, StorageError, StorageResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Reads a JSON document, returning `T::default()` when the file is absent
pub fn read_json_or_default<T>(path: &Path) -> StorageResult<T>
where
    T: DeserializeOwned + Default,
{
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
        Err(source) => {
            return Err(StorageError::Io {
                path: path.display().to_string(),
                source,
            })
        }
    };

    if content.trim().is_empty() {
        return Ok(T::default());
    }

    serde_json::from_str(&content).map_err(|source| StorageError::Json {
        path: path.display().to_string(),
        source,
    })
}

/// Writes a JSON document atomically (temp file + rename)
pub fn write_json_atomic<T>(path: &Path, value: &T) -> StorageResult<()>
where
    T: Serialize + ?Sized,
{
    let display = path.display().to_string();
    let io_err = |source| StorageError::Io {
        path: display.clone(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(io_err)?;

    let temp = NamedTempFile::new_in(&dir).map_err(io_err)?;
    {
        let mut writer = BufWriter::new(temp.as_file());
        serde_json::to_writer_pretty(&mut writer, value).map_err(|source| StorageError::Json {
            path: display.clone(),
            source,
        })?;
        writer.write_all(b"\n").map_err(io_err)?;
        writer.flush().map_err(io_err)?;
    }
    temp.as_file().sync_all().map_err(io_err)?;

    temp.persist(path).map_err(|source| StorageError::Persist {
        path: display.clone(),
        source,
    })?;

    Ok(())
}

/// Removes a document if it exists
pub fn remove_if_exists(path: &Path) -> StorageResult<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(StorageError::Io {
            path: path.display().to_string(),
            source,
        }),
    }
}

/// Checkpoint store backed by two JSON documents
///
/// The results document is an ordered list of campaign subtrees; the
/// cursor document is `{"last_completed_campaign_id": ...}`. Results are
/// written before the cursor, so after a crash between the two writes the
/// cursor can only lag behind the results.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    results_path: PathBuf,
    cursor_path: PathBuf,
}

impl JsonFileStore {
    pub fn new(results_path: impl Into<PathBuf>, cursor_path: impl Into<PathBuf>) -> Self {
        Self {
            results_path: results_path.into(),
            cursor_path: cursor_path.into(),
        }
    }

    pub fn results_path(&self) -> &Path {
        &self.results_path
    }

    pub fn cursor_path(&self) -> &Path {
        &self.cursor_path
    }
}

impl CheckpointStore for JsonFileStore {
    fn load(&self) -> StorageResult<Checkpoint> {
        let results: Vec<CampaignRecord> = read_json_or_default(&self.results_path)?;
        let cursor: ResumeCursor = read_json_or_default(&self.cursor_path)?;
        Ok(Checkpoint { results, cursor })
    }

    fn save(&mut self, results: &[CampaignRecord], cursor: &ResumeCursor) -> StorageResult<()> {
        write_json_atomic(&self.results_path, results)?;
        write_json_atomic(&self.cursor_path, cursor)?;
        Ok(())
    }

    fn clear(&mut self) -> StorageResult<()> {
        remove_if_exists(&self.cursor_path)?;
        remove_if_exists(&self.results_path)?;
        Ok(())
    }
}
