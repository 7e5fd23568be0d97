//! Vertigo-DX Core - differential-diagnosis decision support
//!
//! Scores five candidate vertigo diagnoses (BPPV, VN, SSNHL, Meniere,
//! Others) with independently trained one-vs-rest classifiers and
//! decomposes the top prediction into per-feature contributions.
//!
//! The pipeline is synchronous and per-request: map a clinical answer set
//! onto the canonical 82-feature schema, score every model, pick the
//! maximum, explain the winner. Model artifacts are fetched once from the
//! blob store and cached in memory for the process lifetime. This is a
//! decision-support aid; the final diagnosis belongs to the clinician.

pub mod api;
pub mod constants;
pub mod logic;

pub use api::report::DiagnosisReport;
pub use api::run_diagnosis;
pub use logic::explain::{AttributionResult, ExplainError};
pub use logic::features::{FeatureVector, FEATURE_COUNT, FEATURE_LAYOUT};
pub use logic::intake::{map_answers, ClinicalAnswers};
pub use logic::model::{
    predict, select_top, ArtifactStore, DirStore, DiseaseLabel, DiseaseModel, HttpStore,
    LoadError, ModelRepository, ModelSet, PredictionError, RepositoryConfig,
};
