//! Attribution result types

use serde::Serialize;

use crate::logic::model::DiseaseLabel;

/// One feature's signed attribution for one vector
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureContribution {
    pub name: String,
    /// Signed attribution: positive pushes toward the disease
    pub value: f64,
    /// The densified input value the model actually saw
    pub feature_value: f64,
}

/// Importance-ranking entry. The magnitude is derived from this one
/// instance's attribution, standing in for a dataset-wide mean |value|;
/// see `engine::explain` for the caveat.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportanceEntry {
    pub name: String,
    pub mean_abs: f64,
}

/// Additive attribution of one model's score for one vector:
/// `baseline + sum(contributions) == raw_score` (exact up to float error).
#[derive(Debug, Clone, Serialize)]
pub struct AttributionResult {
    pub disease: DiseaseLabel,
    /// Expected score absent any patient-specific information
    pub baseline: f64,
    /// The model's raw decision score for this vector
    pub raw_score: f64,
    /// All features in canonical schema order
    pub contributions: Vec<FeatureContribution>,
}

impl AttributionResult {
    /// `baseline + sum(all contributions)` - equals `raw_score` when the
    /// contributions are untruncated; a top-N slice reconstructs only
    /// approximately.
    pub fn reconstructed_score(&self) -> f64 {
        self.baseline + self.contributions.iter().map(|c| c.value).sum::<f64>()
    }

    /// Top-N contributions by absolute magnitude, signs preserved, for a
    /// waterfall-style rendering.
    pub fn local_top(&self, n: usize) -> Vec<FeatureContribution> {
        let mut ranked = self.contributions.clone();
        ranked.sort_by(|a, b| {
            b.value
                .abs()
                .partial_cmp(&a.value.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked.truncate(n);
        ranked
    }

    /// Top-N magnitudes presented as importance context.
    pub fn importance_top(&self, n: usize) -> Vec<ImportanceEntry> {
        self.local_top(n)
            .into_iter()
            .map(|c| ImportanceEntry { name: c.name, mean_abs: c.value.abs() })
            .collect()
    }
}

/// Recoverable: attribution could not be computed. The surrounding flow
/// reports "unavailable" and keeps the prediction result.
#[derive(Debug, Clone, Serialize)]
pub struct ExplainError {
    pub disease: DiseaseLabel,
    pub reason: String,
}

impl std::fmt::Display for ExplainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Attribution failed for {}: {}", self.disease, self.reason)
    }
}

impl std::error::Error for ExplainError {}
