//! Model Module - Artifacts, Repository, Scoring
//!
//! `artifact.rs` deserializes and scores one disease model; `repository.rs`
//! owns the load-once cache over an artifact store; `scoring.rs` runs all
//! five models over one vector and selects the top prediction.

pub mod artifact;
pub mod repository;
pub mod scoring;

use serde::{Deserialize, Serialize};

// Re-export common types
pub use artifact::{DiseaseModel, ModelArtifact, OutputLayout, WeightRow, ARTIFACT_FORMAT_VERSION};
pub use repository::{ArtifactStore, DirStore, HttpStore, ModelRepository, ModelSet, RepositoryConfig};
pub use scoring::{predict, select_top, PredictionOutcome};

// ============================================================================
// DISEASE LABELS
// ============================================================================

/// The fixed set of candidate diagnoses. The declaration order is the
/// canonical label order used for reports and for deterministic tie-breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiseaseLabel {
    #[serde(rename = "BPPV")]
    Bppv,
    #[serde(rename = "VN")]
    Vn,
    #[serde(rename = "SSNHL")]
    Ssnhl,
    #[serde(rename = "Meniere")]
    Meniere,
    #[serde(rename = "Others")]
    Others,
}

impl DiseaseLabel {
    pub const ALL: [DiseaseLabel; 5] = [
        DiseaseLabel::Bppv,
        DiseaseLabel::Vn,
        DiseaseLabel::Ssnhl,
        DiseaseLabel::Meniere,
        DiseaseLabel::Others,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DiseaseLabel::Bppv => "BPPV",
            DiseaseLabel::Vn => "VN",
            DiseaseLabel::Ssnhl => "SSNHL",
            DiseaseLabel::Meniere => "Meniere",
            DiseaseLabel::Others => "Others",
        }
    }

    /// Clinical display name for the presentation layer
    pub fn display_name(self) -> &'static str {
        match self {
            DiseaseLabel::Bppv => "Benign Paroxysmal Positional Vertigo (BPPV)",
            DiseaseLabel::Vn => "Vestibular Neuritis",
            DiseaseLabel::Ssnhl => "Sudden Sensorineural Hearing Loss (SSNHL)",
            DiseaseLabel::Meniere => "Meniere's Disease",
            DiseaseLabel::Others => "Other Causes",
        }
    }
}

impl std::fmt::Display for DiseaseLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Fatal: an artifact could not be fetched or deserialized. A partial
/// model set is never usable, so this aborts the whole load.
#[derive(Debug, Clone)]
pub enum LoadError {
    Fetch { artifact_id: String, reason: String },
    DigestMismatch { artifact_id: String, expected: String, actual: String },
    Deserialize { artifact_id: String, reason: String },
    SchemaMismatch { disease: String, reason: String },
    MissingArtifact { disease: String },
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fetch { artifact_id, reason } => {
                write!(f, "Failed to fetch artifact '{}': {}", artifact_id, reason)
            }
            Self::DigestMismatch { artifact_id, expected, actual } => write!(
                f,
                "Digest mismatch for artifact '{}': expected {}, got {}",
                artifact_id, expected, actual
            ),
            Self::Deserialize { artifact_id, reason } => {
                write!(f, "Failed to deserialize artifact '{}': {}", artifact_id, reason)
            }
            Self::SchemaMismatch { disease, reason } => {
                write!(f, "Model '{}' does not match feature schema: {}", disease, reason)
            }
            Self::MissingArtifact { disease } => {
                write!(f, "No artifact configured for disease '{}'", disease)
            }
        }
    }
}

impl std::error::Error for LoadError {}

/// Recoverable: one model's scoring call failed. The caller records a zero
/// probability for that disease and keeps going.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionError {
    pub disease: DiseaseLabel,
    pub reason: String,
}

impl std::fmt::Display for PredictionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Prediction failed for {}: {}", self.disease, self.reason)
    }
}

impl std::error::Error for PredictionError {}

// ============================================================================
// TESTS
// ============================================================================
