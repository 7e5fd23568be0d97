//! Explanation Engine - additive feature attribution
//!
//! Decomposes one model's raw score for one vector into a baseline plus a
//! signed per-feature contribution: phi_i = w_i * (x_i - background_i),
//! baseline = intercept + w . background. For an additive scorer this is
//! the exact Shapley decomposition - local accuracy holds to float
//! precision rather than by approximation.
//!
//! Models with a `per_class` layout expose a negative and a positive
//! weight row; only the positive row enters the attribution, mirroring
//! explainers that return a pair of arrays per class.
//!
//! The importance ranking (`importance_top`) reuses this single-instance
//! attribution as its magnitude source. It is a proxy, not a dataset-wide
//! statistic; true global importance would be averaged over a held-out set.

use log::debug;
use ndarray::Array1;

use crate::logic::features::feature_index;
use crate::logic::features::FeatureVector;
use crate::logic::model::DiseaseModel;
use super::types::{AttributionResult, ExplainError, FeatureContribution};

/// Compute the full attribution for one model and one vector.
pub fn explain(model: &DiseaseModel, vector: &FeatureVector) -> Result<AttributionResult, ExplainError> {
    let disease = model.disease();
    let fail = |reason: String| ExplainError { disease, reason };

    let dense = model
        .densify(vector)
        .map_err(|e| fail(e.reason))?;

    let row = model.positive_row();
    let weights = Array1::from_iter(row.weights.iter().copied());
    let background = Array1::from_iter(model.background().iter().copied());

    let baseline = row.intercept + weights.dot(&background);
    if !baseline.is_finite() {
        return Err(fail("non-finite baseline".to_string()));
    }

    // Per-column signed contributions, then reordered into schema order
    // for presentation.
    let mut indexed: Vec<(usize, FeatureContribution)> = Vec::with_capacity(dense.len());
    for (column, (&w, &bg)) in row.weights.iter().zip(model.background().iter()).enumerate() {
        let x = dense[column];
        let value = w * (x - bg);
        if !value.is_finite() {
            let name = model.column_name(column).unwrap_or("?");
            return Err(fail(format!("non-finite contribution for '{}'", name)));
        }
        let name = model
            .column_name(column)
            .ok_or_else(|| fail(format!("missing name for column {}", column)))?
            .to_string();
        let schema_idx = feature_index(&name)
            .ok_or_else(|| fail(format!("feature '{}' not in schema", name)))?;
        indexed.push((schema_idx, FeatureContribution { name, value, feature_value: x }));
    }
    indexed.sort_by_key(|(idx, _)| *idx);
    let contributions: Vec<FeatureContribution> = indexed.into_iter().map(|(_, c)| c).collect();

    let raw_score = model.raw_score_dense(&dense);
    if !raw_score.is_finite() {
        return Err(fail("non-finite raw score".to_string()));
    }

    debug!(
        "Attribution for {}: baseline {:.4}, raw {:.4}",
        disease, baseline, raw_score
    );

    Ok(AttributionResult { disease, baseline, raw_score, contributions })
}

// ============================================================================
// TESTS
// ============================================================================
