//! API Module - the full prediction pipeline behind one call
//!
//! map answers -> score all models -> select top -> explain the winner.
//! Fatal errors never originate here: model loading happens before this
//! point, and everything downstream degrades gracefully into warnings.

pub mod report;

use chrono::Utc;
use log::{info, warn};
use uuid::Uuid;

use crate::logic::explain;
use crate::logic::intake::{map_answers, ClinicalAnswers, Sex};
use crate::logic::model::{predict, select_top, repository::ModelSet};
use report::{
    AttributionViews, DiagnosisReport, DiseaseProbability, InputSummary, TopPrediction,
    IMPORTANCE_TOP_N, LOCAL_TOP_N,
};

/// Run one complete diagnosis over an already-loaded model set.
pub fn run_diagnosis(models: &ModelSet, answers: &ClinicalAnswers) -> DiagnosisReport {
    let vector = map_answers(answers);
    let outcome = predict(models, &vector);
    let (top_label, top_probability) = select_top(&outcome);

    let mut warnings: Vec<String> = outcome.warnings.iter().map(|w| w.to_string()).collect();

    let attribution = match models.get(top_label) {
        Some(model) => match explain::explain(model, &vector) {
            Ok(result) => Some(AttributionViews {
                disease: top_label,
                baseline: result.baseline,
                raw_score: result.raw_score,
                local_top: result.local_top(LOCAL_TOP_N),
                importance_top: result.importance_top(IMPORTANCE_TOP_N),
            }),
            Err(error) => {
                warn!("{}", error);
                warnings.push(format!("Attribution unavailable: {}", error));
                None
            }
        },
        None => {
            warnings.push(format!("No model loaded for {}", top_label));
            None
        }
    };

    let probabilities: Vec<DiseaseProbability> = outcome
        .probabilities
        .iter()
        .map(|&(label, probability)| DiseaseProbability {
            label,
            display_name: label.display_name().to_string(),
            probability,
        })
        .collect();

    let mut ranked = probabilities.clone();
    ranked.sort_by(|a, b| {
        b.probability
            .partial_cmp(&a.probability)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let answered = vector.values.len() - vector.missing_count();
    let report = DiagnosisReport {
        request_id: Uuid::new_v4(),
        generated_at: Utc::now(),
        patient_name: answers.patient_name.clone(),
        probabilities,
        ranked,
        top: TopPrediction {
            label: top_label,
            display_name: top_label.display_name().to_string(),
            probability: top_probability,
        },
        attribution,
        input_summary: InputSummary {
            age: answers.age,
            sex: answers.sex.map(|s| match s {
                Sex::Female => "female".to_string(),
                Sex::Male => "male".to_string(),
            }),
            true_vertigo: answers.true_vertigo,
            hearing_impairment: answers.hearing_impairment,
            tinnitus: answers.tinnitus,
            answered_features: answered,
            missing_features: vector.missing_count(),
        },
        warnings,
    };

    info!(
        "Diagnosis {}: top {} at {:.3} ({} warnings)",
        report.request_id,
        report.top.label,
        report.top.probability,
        report.warnings.len()
    );

    report
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_ARTIFACT_IDS;
    use crate::logic::intake::DurationBucket;
    use crate::logic::model::artifact::test_artifact;
    use crate::logic::model::repository::{DirStore, ModelRepository, RepositoryConfig};
    use crate::logic::model::DiseaseLabel;

    fn loaded_set() -> std::sync::Arc<ModelSet> {
        let tmp = tempfile::tempdir().unwrap();
        for (&label, &(_, id)) in DiseaseLabel::ALL.iter().zip(DEFAULT_ARTIFACT_IDS.iter()) {
            let mut artifact = test_artifact(label);
            // Give each disease a distinct intercept so the ranking is stable
            artifact.positive.intercept = match label {
                DiseaseLabel::Bppv => 0.5,
                DiseaseLabel::Vn => -0.5,
                DiseaseLabel::Ssnhl => -1.0,
                DiseaseLabel::Meniere => -1.5,
                DiseaseLabel::Others => -2.0,
            };
            let bytes = serde_json::to_vec(&artifact).unwrap();
            std::fs::write(tmp.path().join(format!("{}.json", id)), bytes).unwrap();
        }
        let repo = ModelRepository::new(RepositoryConfig::default().without_cache());
        repo.load(&DirStore::new(tmp.path())).unwrap()
    }

    fn answers() -> ClinicalAnswers {
        ClinicalAnswers {
            patient_name: Some("case-01".to_string()),
            age: Some(45.0),
            sex: Some(Sex::Female),
            true_vertigo: Some(true),
            recurrence: Some(true),
            duration: Some(DurationBucket::SeveralMinutes),
            ..Default::default()
        }
    }

    #[test]
    fn test_report_covers_all_diseases() {
        let report = run_diagnosis(&loaded_set(), &answers());
        assert_eq!(report.probabilities.len(), 5);
        assert_eq!(report.ranked.len(), 5);
        assert_eq!(report.top.label, DiseaseLabel::Bppv);
        assert_eq!(report.ranked[0].label, report.top.label);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_report_attribution_views() {
        let report = run_diagnosis(&loaded_set(), &answers());
        let attribution = report.attribution.expect("attribution should be available");
        assert_eq!(attribution.disease, report.top.label);
        assert_eq!(attribution.local_top.len(), LOCAL_TOP_N);
        assert_eq!(attribution.importance_top.len(), IMPORTANCE_TOP_N);
    }

    #[test]
    fn test_report_input_summary() {
        let report = run_diagnosis(&loaded_set(), &answers());
        assert_eq!(report.patient_name.as_deref(), Some("case-01"));
        assert_eq!(report.input_summary.age, Some(45.0));
        assert_eq!(report.input_summary.sex.as_deref(), Some("female"));
        let summary = &report.input_summary;
        assert_eq!(summary.answered_features + summary.missing_features, 82);
    }

    #[test]
    fn test_report_serializes() {
        let report = run_diagnosis(&loaded_set(), &answers());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["top"]["label"], "BPPV");
        assert!(json["attribution"]["local_top"].is_array());
    }
}
