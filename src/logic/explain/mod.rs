//! Explain Module - per-feature attribution for the winning model

pub mod engine;
pub mod types;

// Re-export common types
pub use engine::explain;
pub use types::{AttributionResult, ExplainError, FeatureContribution, ImportanceEntry};
