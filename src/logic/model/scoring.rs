//! Prediction Engine
//!
//! Runs every disease model over one feature vector. Scoring is pure and
//! sequential; a single model's failure degrades to a zero probability for
//! that disease and a recorded warning, never an aborted run.

use log::warn;
use serde::Serialize;

use crate::logic::features::FeatureVector;
use super::{repository::ModelSet, DiseaseLabel, PredictionError};

/// Per-disease probabilities plus any per-model degradations. Exactly one
/// entry per known label, in canonical order. The five classifiers are
/// independent one-vs-rest models, so the probabilities are not expected
/// to sum to 1.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionOutcome {
    pub probabilities: Vec<(DiseaseLabel, f64)>,
    pub warnings: Vec<PredictionError>,
}

impl PredictionOutcome {
    pub fn probability(&self, label: DiseaseLabel) -> Option<f64> {
        self.probabilities
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, p)| *p)
    }
}

/// Score every model on the one vector. Pure in (model set, vector).
pub fn predict(models: &ModelSet, vector: &FeatureVector) -> PredictionOutcome {
    let mut probabilities = Vec::with_capacity(models.len());
    let mut warnings = Vec::new();

    for (label, model) in models.iter() {
        match model.predict_proba(vector) {
            Ok(probability) => probabilities.push((label, probability)),
            Err(error) => {
                warn!("{}", error);
                probabilities.push((label, 0.0));
                warnings.push(error);
            }
        }
    }

    PredictionOutcome { probabilities, warnings }
}

/// The label with the maximum probability. Tie-break is deterministic:
/// the first maximum in the fixed label order wins.
pub fn select_top(outcome: &PredictionOutcome) -> (DiseaseLabel, f64) {
    let mut top = (DiseaseLabel::Others, f64::NEG_INFINITY);
    for &(label, probability) in &outcome.probabilities {
        if probability > top.1 {
            top = (label, probability);
        }
    }
    top
}

// ============================================================================
// TESTS
// ============================================================================
