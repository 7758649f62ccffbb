//! Question storage for the quizbuzz quiz engine.
//!
//! This crate persists the question bank and hands the round engine the
//! enabled subset at session start.
//!
//! # Architecture
//!
//! - [`QuestionStore`] - read/write of the ordered record list
//!   ([`JsonFileStore`] on disk, [`MemoryStore`] for tests)
//! - [`QuestionBank`] - the bank contract on top of a store: minimum length,
//!   regeneration of a default bank, enabled-subset snapshots, editing
//! - [`QuestionRecord`] - the persisted form of one question
//!
//! # Examples
//!
//! ```no_run
//! use quizbuzz_storage::{JsonFileStore, QuestionBank, StoreConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let bank = QuestionBank::new(JsonFileStore::new(StoreConfig::new("questions.json")));
//!
//! // Taken once per session; edits made afterwards are not seen by it.
//! let questions = bank.load_enabled().await;
//! println!("{} questions enabled", questions.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Recovery
//!
//! A malformed store is a data error, not a startup failure: the bank
//! writes 13 disabled placeholder questions in its place and carries on.

pub mod bank;
pub mod error;
pub mod record;
pub mod store;

pub use bank::QuestionBank;
pub use error::{StorageError, StorageResult};
pub use record::{QuestionRecord, default_bank, default_records};
pub use store::{JsonFileStore, MemoryStore, QuestionStore, StoreConfig};
