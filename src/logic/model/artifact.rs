//! Disease Model Artifact
//!
//! One trained one-vs-rest classifier, shipped as a JSON artifact from the
//! blob store. The scorer is additive: raw score = intercept + w·x with a
//! sigmoid link, which keeps the per-feature attribution decomposition
//! exact (see `logic::explain`).
//!
//! The artifact declares its own training-time column order; it may be a
//! permutation of the canonical layout. An index map is built at load time
//! and every incoming vector is reindexed through it before scoring —
//! column order is part of the model's input contract.

use chrono::{DateTime, Utc};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::logic::features::{
    feature_index, validate_layout, FeatureVector, FEATURE_COUNT,
};
use super::{DiseaseLabel, LoadError, PredictionError};

/// Current artifact format version
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

// ============================================================================
// ARTIFACT FORMAT
// ============================================================================

/// How the trained model exposes its weight rows.
///
/// `Positive` is the single-array case; `PerClass` ships an explicit
/// negative/positive pair, of which only the positive row is ever used for
/// scoring and attribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputLayout {
    Positive,
    PerClass,
}

/// One class's weight row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightRow {
    /// Per-feature weights, in the artifact's `feature_names` order
    pub weights: Vec<f64>,
    pub intercept: f64,
}

/// The serialized model artifact as fetched from the blob store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub disease: DiseaseLabel,
    /// Feature schema version the model was trained against
    pub feature_version: u8,
    /// CRC32 of that schema (see `features::layout`)
    pub layout_hash: u32,
    /// Training-time column order; a permutation of the canonical layout
    pub feature_names: Vec<String>,
    pub output_layout: OutputLayout,
    /// Positive-class weight row (the one that answers "disease matches")
    pub positive: WeightRow,
    /// Negative-class row, present only for `per_class` artifacts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative: Option<WeightRow>,
    /// Training-set expectation per feature (attribution baseline reference)
    pub background: Vec<f64>,
    /// Learned substitution per feature for a missing input. Distinct from
    /// zero and from `background`: "not asked" has its own learned value.
    pub fill: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trained_at: Option<DateTime<Utc>>,
}

// ============================================================================
// LOADED MODEL
// ============================================================================

/// A validated, ready-to-score disease model. Immutable after load.
#[derive(Debug, Clone)]
pub struct DiseaseModel {
    artifact: ModelArtifact,
    /// Artifact column -> canonical layout index
    schema_index: Vec<usize>,
    loaded_at: DateTime<Utc>,
}

impl DiseaseModel {
    /// Deserialize and validate one artifact.
    pub fn from_bytes(artifact_id: &str, bytes: &[u8]) -> Result<Self, LoadError> {
        let artifact: ModelArtifact =
            serde_json::from_slice(bytes).map_err(|e| LoadError::Deserialize {
                artifact_id: artifact_id.to_string(),
                reason: e.to_string(),
            })?;
        Self::from_artifact(artifact)
    }

    /// Validate an already-deserialized artifact and build the index map.
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, LoadError> {
        let schema_index = validate_artifact(&artifact)?;
        Ok(Self {
            artifact,
            schema_index,
            loaded_at: Utc::now(),
        })
    }

    pub fn disease(&self) -> DiseaseLabel {
        self.artifact.disease
    }

    pub fn output_layout(&self) -> OutputLayout {
        self.artifact.output_layout
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Feature name of an artifact column
    pub fn column_name(&self, column: usize) -> Option<&str> {
        self.artifact.feature_names.get(column).map(|s| s.as_str())
    }

    /// The positive-class weight row. For `per_class` artifacts the
    /// negative row exists but is never scored.
    pub fn positive_row(&self) -> &WeightRow {
        &self.artifact.positive
    }

    /// Training-set expectation per feature, artifact column order
    pub fn background(&self) -> &[f64] {
        &self.artifact.background
    }

    /// Resolve the vector into a dense array in artifact column order,
    /// substituting the model's learned fill value for missing inputs.
    pub fn densify(&self, vector: &FeatureVector) -> Result<Array1<f64>, PredictionError> {
        vector.validate().map_err(|e| PredictionError {
            disease: self.artifact.disease,
            reason: e.to_string(),
        })?;
        if vector.values.len() != FEATURE_COUNT {
            return Err(PredictionError {
                disease: self.artifact.disease,
                reason: format!(
                    "vector has {} values, expected {}",
                    vector.values.len(),
                    FEATURE_COUNT
                ),
            });
        }

        let mut dense = Array1::zeros(FEATURE_COUNT);
        for (column, &schema_idx) in self.schema_index.iter().enumerate() {
            let value = vector.values[schema_idx].unwrap_or(self.artifact.fill[column]);
            if !value.is_finite() {
                return Err(PredictionError {
                    disease: self.artifact.disease,
                    reason: format!(
                        "non-finite value for feature '{}'",
                        self.artifact.feature_names[column]
                    ),
                });
            }
            dense[column] = value;
        }
        Ok(dense)
    }

    /// Raw additive decision score for one vector
    pub fn raw_score(&self, vector: &FeatureVector) -> Result<f64, PredictionError> {
        let dense = self.densify(vector)?;
        Ok(self.raw_score_dense(&dense))
    }

    /// Raw score over an already-densified input (artifact column order)
    pub fn raw_score_dense(&self, dense: &Array1<f64>) -> f64 {
        let weights = Array1::from_iter(self.artifact.positive.weights.iter().copied());
        self.artifact.positive.intercept + weights.dot(dense)
    }

    /// Positive-class probability for one vector
    pub fn predict_proba(&self, vector: &FeatureVector) -> Result<f64, PredictionError> {
        let raw = self.raw_score(vector)?;
        if !raw.is_finite() {
            return Err(PredictionError {
                disease: self.artifact.disease,
                reason: "non-finite raw score".to_string(),
            });
        }
        Ok(sigmoid(raw))
    }
}

/// Logistic link
pub fn sigmoid(raw: f64) -> f64 {
    1.0 / (1.0 + (-raw).exp())
}

// ============================================================================
// VALIDATION
// ============================================================================

/// Check the artifact against the canonical schema and build the
/// column -> layout index map. All-or-nothing: any inconsistency is a
/// `LoadError`.
fn validate_artifact(artifact: &ModelArtifact) -> Result<Vec<usize>, LoadError> {
    let disease = artifact.disease.as_str().to_string();
    let mismatch = |reason: String| LoadError::SchemaMismatch {
        disease: disease.clone(),
        reason,
    };

    if artifact.format_version != ARTIFACT_FORMAT_VERSION {
        return Err(mismatch(format!(
            "unsupported artifact format v{}",
            artifact.format_version
        )));
    }

    validate_layout(artifact.feature_version, artifact.layout_hash)
        .map_err(|e| mismatch(e.to_string()))?;

    if artifact.feature_names.len() != FEATURE_COUNT {
        return Err(mismatch(format!(
            "{} feature columns, expected {}",
            artifact.feature_names.len(),
            FEATURE_COUNT
        )));
    }

    let mut schema_index = Vec::with_capacity(FEATURE_COUNT);
    let mut seen = vec![false; FEATURE_COUNT];
    for name in &artifact.feature_names {
        let idx = feature_index(name)
            .ok_or_else(|| mismatch(format!("unknown feature '{}'", name)))?;
        if seen[idx] {
            return Err(mismatch(format!("duplicate feature '{}'", name)));
        }
        seen[idx] = true;
        schema_index.push(idx);
    }

    check_row(&artifact.positive, "positive", &mismatch)?;
    match (artifact.output_layout, &artifact.negative) {
        (OutputLayout::PerClass, Some(negative)) => check_row(negative, "negative", &mismatch)?,
        (OutputLayout::PerClass, None) => {
            return Err(mismatch("per_class layout without a negative row".to_string()));
        }
        (OutputLayout::Positive, _) => {}
    }

    for (field, values) in [("background", &artifact.background), ("fill", &artifact.fill)] {
        if values.len() != FEATURE_COUNT {
            return Err(mismatch(format!(
                "{} has {} entries, expected {}",
                field,
                values.len(),
                FEATURE_COUNT
            )));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(mismatch(format!("non-finite entry in {}", field)));
        }
    }

    Ok(schema_index)
}

fn check_row(
    row: &WeightRow,
    which: &str,
    mismatch: &impl Fn(String) -> LoadError,
) -> Result<(), LoadError> {
    if row.weights.len() != FEATURE_COUNT {
        return Err(mismatch(format!(
            "{} row has {} weights, expected {}",
            which,
            row.weights.len(),
            FEATURE_COUNT
        )));
    }
    if row.weights.iter().any(|w| !w.is_finite()) || !row.intercept.is_finite() {
        return Err(mismatch(format!("non-finite weight in {} row", which)));
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

/// Canonical-order artifact with uniform small weights, shared by the unit
/// tests across this module tree.
#[cfg(test)]
pub(crate) fn test_artifact(disease: DiseaseLabel) -> ModelArtifact {
    use crate::logic::features::{layout_hash, FEATURE_LAYOUT, FEATURE_VERSION};

    ModelArtifact {
        format_version: ARTIFACT_FORMAT_VERSION,
        disease,
        feature_version: FEATURE_VERSION,
        layout_hash: layout_hash(),
        feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
        output_layout: OutputLayout::Positive,
        positive: WeightRow {
            weights: vec![0.01; FEATURE_COUNT],
            intercept: -1.0,
        },
        negative: None,
        background: vec![0.0; FEATURE_COUNT],
        fill: vec![0.0; FEATURE_COUNT],
        trained_at: None,
    }
}
