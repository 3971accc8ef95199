//! Vocabulary mastery tracking.
//!
//! A SQLite-backed store keyed by word (case-insensitive), tracking five
//! grammatical forms per word with per-form mastery flags, a latest-wins
//! accuracy score, and an append-only review history. The grading module
//! turns a graded word-transformation review back into mastery updates.

pub mod grading;
pub mod store;

pub use grading::{parse_word_grades, WordGrade};
pub use store::{
    FormStatus, MasteryUpdate, ReviewRecord, VocabStats, VocabStore, WordDetails, WordSummary,
    CANONICAL_FORMS,
};
