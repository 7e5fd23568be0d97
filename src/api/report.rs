//! Diagnosis Report - presentation-facing output
//!
//! Plain serializable structures; the presentation layer renders them as
//! text, tables, or charts. Nothing here is persisted.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::logic::explain::{FeatureContribution, ImportanceEntry};
use crate::logic::model::DiseaseLabel;

/// Contributions shown in the waterfall view
pub const LOCAL_TOP_N: usize = 10;

/// Entries shown in the importance view
pub const IMPORTANCE_TOP_N: usize = 20;

/// One disease's probability with its display name
#[derive(Debug, Clone, Serialize)]
pub struct DiseaseProbability {
    pub label: DiseaseLabel,
    pub display_name: String,
    pub probability: f64,
}

/// The winning prediction
#[derive(Debug, Clone, Serialize)]
pub struct TopPrediction {
    pub label: DiseaseLabel,
    pub display_name: String,
    pub probability: f64,
}

/// The two ranked attribution views for the winning model. `importance_top`
/// ranks this instance's attribution magnitudes as an importance proxy.
#[derive(Debug, Clone, Serialize)]
pub struct AttributionViews {
    pub disease: DiseaseLabel,
    pub baseline: f64,
    pub raw_score: f64,
    pub local_top: Vec<FeatureContribution>,
    pub importance_top: Vec<ImportanceEntry>,
}

/// Echo of the headline inputs, for the report page
#[derive(Debug, Clone, Serialize)]
pub struct InputSummary {
    pub age: Option<f64>,
    pub sex: Option<String>,
    pub true_vertigo: Option<bool>,
    pub hearing_impairment: Option<bool>,
    pub tinnitus: Option<bool>,
    pub answered_features: usize,
    pub missing_features: usize,
}

/// Complete result of one prediction request
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosisReport {
    pub request_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub patient_name: Option<String>,
    /// Canonical label order
    pub probabilities: Vec<DiseaseProbability>,
    /// Sorted by probability, descending (display order)
    pub ranked: Vec<DiseaseProbability>,
    pub top: TopPrediction,
    /// `None` when the attribution computation failed; the prediction
    /// itself is still reported
    pub attribution: Option<AttributionViews>,
    pub input_summary: InputSummary,
    pub warnings: Vec<String>,
}
