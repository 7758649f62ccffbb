//! Question store backends.
//!
//! A store only knows how to read and write the ordered record list. The
//! bank contract (minimum length, recovery by regeneration, enabled
//! filtering) lives in [`QuestionBank`](crate::QuestionBank).

#![allow(async_fn_in_trait)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use quizbuzz_core::constants::MIN_BANK_LENGTH;
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{StorageError, StorageResult};
use crate::record::QuestionRecord;

/// Read/write access to the ordered list of question records.
pub trait QuestionStore {
    /// Load every record in stored order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is missing, unreadable, not a list of
    /// records, or shorter than the minimum bank length.
    async fn load(&self) -> StorageResult<Vec<QuestionRecord>>;

    /// Replace the stored list.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    async fn save(&self, records: &[QuestionRecord]) -> StorageResult<()>;

    /// Fewest records `load` accepts.
    fn minimum_length(&self) -> usize;
}

/// Question store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path to the JSON question file
    pub path: PathBuf,

    /// Stores holding fewer records are regenerated
    pub min_length: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("questions.json"),
            min_length: MIN_BANK_LENGTH,
        }
    }
}

impl StoreConfig {
    /// Create a new store configuration with the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Set the minimum number of records
    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = min;
        self
    }
}

fn check_length(records: &[QuestionRecord], min_length: usize) -> StorageResult<()> {
    if records.len() < min_length {
        return Err(StorageError::Malformed(format!(
            "{} questions stored, at least {min_length} required",
            records.len()
        )));
    }
    Ok(())
}

/// JSON file store, four-space indented.
///
/// Writes go to a sibling temporary file that is then renamed over the
/// target, so a crash mid-write never leaves a truncated bank behind.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    config: StoreConfig,
}

impl JsonFileStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    /// Store at `path` with the default minimum length.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self::new(StoreConfig::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    fn encode(records: &[QuestionRecord]) -> StorageResult<Vec<u8>> {
        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        records.serialize(&mut serializer)?;
        Ok(buf)
    }
}

impl QuestionStore for JsonFileStore {
    async fn load(&self) -> StorageResult<Vec<QuestionRecord>> {
        let raw = tokio::fs::read(&self.config.path).await?;
        let records: Vec<QuestionRecord> = serde_json::from_slice(&raw)?;
        check_length(&records, self.config.min_length)?;
        debug!(path = %self.config.path.display(), count = records.len(), "loaded questions");
        Ok(records)
    }

    fn minimum_length(&self) -> usize {
        self.config.min_length
    }

    async fn save(&self, records: &[QuestionRecord]) -> StorageResult<()> {
        let path = &self.config.path;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut tmp = path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, Self::encode(records)?).await?;
        tokio::fs::rename(&tmp, path).await?;
        debug!(path = %path.display(), count = records.len(), "saved questions");
        Ok(())
    }
}

/// In-memory store for tests and for running without a writable disk.
///
/// Clones share the same records.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    records: Arc<Mutex<Option<Vec<QuestionRecord>>>>,
    min_length: usize,
}

impl MemoryStore {
    /// An empty store; the first load reports it missing.
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(None)),
            min_length: MIN_BANK_LENGTH,
        }
    }

    /// A store pre-filled with `records`.
    pub fn with_records(records: Vec<QuestionRecord>) -> Self {
        Self {
            records: Arc::new(Mutex::new(Some(records))),
            min_length: MIN_BANK_LENGTH,
        }
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = min;
        self
    }

    /// Current contents, if any.
    pub async fn snapshot(&self) -> Option<Vec<QuestionRecord>> {
        self.records.lock().await.clone()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl QuestionStore for MemoryStore {
    async fn load(&self) -> StorageResult<Vec<QuestionRecord>> {
        let records = self.records.lock().await.clone().ok_or_else(|| {
            StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no questions stored",
            ))
        })?;
        check_length(&records, self.min_length)?;
        Ok(records)
    }

    async fn save(&self, records: &[QuestionRecord]) -> StorageResult<()> {
        *self.records.lock().await = Some(records.to_vec());
        Ok(())
    }

    fn minimum_length(&self) -> usize {
        self.min_length
    }
}
