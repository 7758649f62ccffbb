//! Stored form of a question.
//!
//! The store is an ordered JSON list of records:
//!
//! ```json
//! [
//!     {
//!         "question": "Capital of France?",
//!         "answers": ["Paris", "Rome", "Madrid", ""],
//!         "correct": 0,
//!         "enabled": true
//!     }
//! ]
//! ```
//!
//! Records keep the four raw answer slots (blanks included) so the editor
//! can show them in place; [`QuestionRecord::to_question`] produces the
//! display form with blanks stripped.

use quizbuzz_core::constants::{MAX_OPTIONS, MIN_BANK_LENGTH};
use quizbuzz_core::Question;
use serde::{Deserialize, Deserializer, Serialize};

/// One question as persisted in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    /// Question text; empty marks a placeholder that is never presented.
    #[serde(default)]
    pub question: String,

    /// Exactly four answer slots; blank slots are not offered.
    #[serde(default = "blank_answers", deserialize_with = "four_slots")]
    pub answers: Vec<String>,

    /// Slot (0-3) holding the correct answer.
    #[serde(default)]
    pub correct: u8,

    /// Whether the question takes part in the next session.
    #[serde(default)]
    pub enabled: bool,
}

fn blank_answers() -> Vec<String> {
    vec![String::new(); MAX_OPTIONS]
}

fn four_slots<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut answers = Vec::<String>::deserialize(deserializer)?;
    answers.resize(MAX_OPTIONS, String::new());
    Ok(answers)
}

impl Default for QuestionRecord {
    fn default() -> Self {
        Self {
            question: String::new(),
            answers: blank_answers(),
            correct: 0,
            enabled: false,
        }
    }
}

impl QuestionRecord {
    /// Create an enabled record.
    pub fn new(question: impl Into<String>, answers: [&str; MAX_OPTIONS], correct: u8) -> Self {
        Self {
            question: question.into(),
            answers: answers.iter().map(|a| a.to_string()).collect(),
            correct,
            enabled: true,
        }
    }

    /// The generated record at position `index` of a default bank.
    pub fn placeholder(index: usize) -> Self {
        Self {
            question: format!("Question {}", index + 1),
            answers: ["Answer A", "Answer B", "Answer C", "Answer D"]
                .iter()
                .map(|a| a.to_string())
                .collect(),
            correct: 0,
            enabled: false,
        }
    }

    /// Convert to the display form used by the round engine.
    ///
    /// A correct slot that is blank or out of range yields a question
    /// without a correct option, which the engine hands to the host.
    pub fn to_question(&self) -> Question {
        let mut slots = self.answers.clone();
        slots.truncate(MAX_OPTIONS);
        let mut question = Question::from_slots(&self.question, slots, usize::from(self.correct))
            .unwrap_or_else(|_| Question::host_adjudicated(&self.question));
        question.enabled = self.enabled;
        question
    }
}

/// The default bank written when the store is missing or unusable.
pub fn default_records() -> Vec<QuestionRecord> {
    default_bank(MIN_BANK_LENGTH)
}

/// A default bank of `len` placeholders, never fewer than the standard 13.
pub fn default_bank(len: usize) -> Vec<QuestionRecord> {
    (0..len.max(MIN_BANK_LENGTH))
        .map(QuestionRecord::placeholder)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bank() {
        let records = default_records();
        assert_eq!(records.len(), 13);
        assert_eq!(records[0].question, "Question 1");
        assert_eq!(records[12].question, "Question 13");
        assert!(records.iter().all(|r| !r.enabled));
        assert!(records.iter().all(|r| r.correct == 0));
        assert_eq!(records[5].answers[3], "Answer D");
    }

    #[test]
    fn test_default_bank_never_shorter_than_standard() {
        assert_eq!(default_bank(5).len(), 13);
        assert_eq!(default_bank(20).len(), 20);
        assert_eq!(default_bank(20)[19].question, "Question 20");
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let record: QuestionRecord = serde_json::from_str(r#"{"question": "Why?"}"#).unwrap();
        assert_eq!(record.question, "Why?");
        assert_eq!(record.answers, vec!["", "", "", ""]);
        assert_eq!(record.correct, 0);
        assert!(!record.enabled);
    }

    #[test]
    fn test_answers_padded_and_truncated() {
        let short: QuestionRecord =
            serde_json::from_str(r#"{"question": "Q", "answers": ["a"]}"#).unwrap();
        assert_eq!(short.answers.len(), 4);

        let long: QuestionRecord =
            serde_json::from_str(r#"{"question": "Q", "answers": ["a","b","c","d","e"]}"#)
                .unwrap();
        assert_eq!(long.answers, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_to_question_strips_blanks() {
        let record = QuestionRecord::new("Largest planet?", ["", "Jupiter", "", "Mars"], 1);
        let question = record.to_question();
        assert_eq!(question.options, vec!["Jupiter", "Mars"]);
        assert_eq!(question.correct, Some(0));
        assert!(question.enabled);
    }

    #[test]
    fn test_to_question_out_of_range_correct() {
        let mut record = QuestionRecord::new("Q", ["a", "b", "c", "d"], 0);
        record.correct = 9;
        assert!(record.to_question().is_host_adjudicated());
    }

    #[test]
    fn test_to_question_all_blank() {
        let record = QuestionRecord::new("Sing a song", ["", "", "", ""], 0);
        let question = record.to_question();
        assert!(question.options.is_empty());
        assert!(question.is_host_adjudicated());
    }
}
