//! Intake Module - Clinical form input & mapping
//!
//! `answers.rs` holds the typed answer set and form-layer range checks;
//! `mapper.rs` turns an answer set into a complete feature vector.

pub mod answers;
pub mod mapper;

// Re-export common types
pub use answers::{
    AnswerValidationError, AttackFrequency, ClinicalAnswers, DurationBucket,
    ExamAnswers, HistoryAnswers, RemoteOnset, Sex,
};
pub use mapper::map_answers;
