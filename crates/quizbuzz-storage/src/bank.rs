//! The question bank: a store plus the rules for reading it.
//!
//! The bank never fails to produce questions. A store that is missing,
//! corrupt, or too short is replaced with the generated default bank and
//! written back; the game starts either way.

use quizbuzz_core::Question;
use tracing::{info, warn};

use crate::error::{StorageError, StorageResult};
use crate::record::{QuestionRecord, default_bank};
use crate::store::QuestionStore;

/// Ordered collection of question records behind a [`QuestionStore`].
///
/// # Examples
///
/// ```
/// use quizbuzz_storage::{MemoryStore, QuestionBank, QuestionRecord};
///
/// # async fn example() -> quizbuzz_storage::StorageResult<()> {
/// let bank = QuestionBank::new(MemoryStore::new());
///
/// // A missing store is regenerated: 13 disabled placeholders.
/// assert_eq!(bank.load_records().await.len(), 13);
/// assert!(bank.load_enabled().await.is_empty());
///
/// bank.edit(0, |record| {
///     *record = QuestionRecord::new("2 + 2?", ["3", "4", "5", ""], 1);
/// })
/// .await?;
/// assert_eq!(bank.load_enabled().await.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct QuestionBank<S> {
    store: S,
}

impl<S: QuestionStore> QuestionBank<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Placeholders generated for this bank's store: enough to satisfy the
    /// store's minimum length.
    fn defaults(&self) -> Vec<QuestionRecord> {
        default_bank(self.store.minimum_length())
    }

    /// Load every record, regenerating the default bank if the stored data
    /// is unusable.
    ///
    /// If the store cannot be read for another reason (such as
    /// permissions), the defaults are returned without overwriting it.
    pub async fn load_records(&self) -> Vec<QuestionRecord> {
        match self.store.load().await {
            Ok(records) => records,
            Err(e) if e.is_data_error() => {
                warn!(error = %e, "question store unusable, writing default bank");
                let defaults = self.defaults();
                if let Err(save_err) = self.store.save(&defaults).await {
                    warn!(error = %save_err, "could not write default bank");
                }
                defaults
            }
            Err(e) => {
                warn!(error = %e, "question store unreadable, using default bank in memory");
                self.defaults()
            }
        }
    }

    /// The enabled questions, in stored order.
    ///
    /// This is the snapshot a session plays; later edits to the bank do not
    /// reach a session that has already taken it. Placeholders without text
    /// are kept so that positions line up with the store; the round engine
    /// skips them.
    pub async fn load_enabled(&self) -> Vec<Question> {
        let enabled: Vec<Question> = self
            .load_records()
            .await
            .iter()
            .filter(|record| record.enabled)
            .map(QuestionRecord::to_question)
            .collect();
        info!(count = enabled.len(), "loaded enabled questions");
        enabled
    }

    /// Replace the stored records.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Malformed` if fewer records are given than the
    /// store would load back, or the store's write error.
    pub async fn persist(&self, records: &[QuestionRecord]) -> StorageResult<()> {
        let minimum = self.store.minimum_length();
        if records.len() < minimum {
            return Err(StorageError::Malformed(format!(
                "refusing to store {} questions, at least {minimum} required",
                records.len()
            )));
        }
        self.store.save(records).await
    }

    /// Modify the record at `index` and persist the whole bank.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` for an index past the end,
    /// `StorageError::Validation` if the edit leaves the correct slot out of
    /// range, or the store's write error.
    pub async fn edit<F>(&self, index: usize, edit: F) -> StorageResult<QuestionRecord>
    where
        F: FnOnce(&mut QuestionRecord),
    {
        let mut records = self.load_records().await;
        let len = records.len();
        let record = records
            .get_mut(index)
            .ok_or(StorageError::NotFound { index, len })?;

        edit(record);
        record.answers.resize(quizbuzz_core::constants::MAX_OPTIONS, String::new());
        if usize::from(record.correct) >= record.answers.len() {
            return Err(StorageError::Validation(format!(
                "correct answer must be 0-{}, got {}",
                record.answers.len() - 1,
                record.correct
            )));
        }

        let edited = record.clone();
        self.persist(&records).await?;
        Ok(edited)
    }

    /// Overwrite the store with the default bank.
    ///
    /// # Errors
    ///
    /// Returns the store's write error.
    pub async fn reset_to_defaults(&self) -> StorageResult<Vec<QuestionRecord>> {
        let defaults = self.defaults();
        self.store.save(&defaults).await?;
        Ok(defaults)
    }
}
