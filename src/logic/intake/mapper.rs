//! Form-to-Vector Mapper
//!
//! Turns a (possibly partial) `ClinicalAnswers` set into a complete
//! `FeatureVector` over the canonical schema. The mapping is total: every
//! schema feature is either written from an answer or left in the missing
//! state, never silently omitted.

use log::debug;

use crate::logic::features::FeatureVector;
use super::answers::{ClinicalAnswers, DurationBucket, RemoteOnset};

/// Both legacy duration coding schemes are driven by the same selection.
/// One derivation, invoked once per prefix, so they cannot drift.
const DURATION_SCHEME_PREFIXES: [&str; 2] = [
    "symptoms_duration_minutes_cat_gen",
    "symptoms_duration_minutes_cat_20m",
];

/// Map one answer set to a complete feature vector in schema order.
pub fn map_answers(answers: &ClinicalAnswers) -> FeatureVector {
    let mut vector = FeatureVector::new();

    // Demographics
    set_num(&mut vector, "age", answers.age);
    if let Some(sex) = answers.sex {
        vector.set_by_name("sex", sex.code());
    }

    // Attack pattern
    set_bool(&mut vector, "symptoms_true_vertigo", answers.true_vertigo);
    set_bool(&mut vector, "symptoms_dizziness_duration_ongoing", answers.dizziness_ongoing);
    set_num(&mut vector, "symptom_recent", answers.days_since_recent_attack);
    if let Some(freq) = answers.frequency {
        vector.set_by_name("symptoms_frequency", freq.code());
    }
    set_bool(&mut vector, "symptoms_recurrence", answers.recurrence);

    if let Some(bucket) = answers.duration {
        vector.set_by_name("symptoms_duration_minutes", bucket.minutes());
        for prefix in DURATION_SCHEME_PREFIXES {
            write_duration_scheme(&mut vector, prefix, bucket);
        }
    }

    if let Some(onset) = answers.remote_onset {
        vector.set_by_name("symptom_remote_cat", onset.ordinal());
        for candidate in RemoteOnset::ALL {
            let hit = if candidate == onset { 1.0 } else { 0.0 };
            vector.set_by_name(candidate.indicator_feature(), hit);
        }
    }

    // Accompanying symptoms
    set_bool(&mut vector, "symptoms_nausea", answers.nausea);
    set_bool(&mut vector, "symptoms_vomiting", answers.vomiting);
    set_bool(&mut vector, "symptoms_headache", answers.headache);
    set_bool(&mut vector, "symptoms_black_out", answers.black_out);

    // Aggravating / relieving factors. The combined flag is a lockstep
    // alias of the position-change checkbox.
    set_bool(&mut vector, "symptoms_agg_factor_position_change", answers.agg_position_change);
    set_bool(
        &mut vector,
        "symptoms_agg_factor_position_change_combined",
        answers.agg_position_change,
    );
    set_bool(&mut vector, "symptoms_agg_factor_head_rotation", answers.agg_head_rotation);
    set_bool(&mut vector, "symptoms_agg_factor_eyes_moving", answers.agg_eyes_moving);
    set_bool(&mut vector, "symptoms_agg_factor_moving", answers.agg_moving);
    set_bool(&mut vector, "symptoms_agg_factor_no_moving", answers.agg_no_moving);
    set_bool(&mut vector, "symptoms_rel_factor_rest", answers.rel_rest);
    set_bool(&mut vector, "symptoms_rel_factor_eyes_closed", answers.rel_eyes_closed);

    // Otologic symptoms
    set_bool(&mut vector, "symptoms_hearing_impairment_combined", answers.hearing_impairment);
    set_bool(&mut vector, "symptoms_tinnitus", answers.tinnitus);
    set_bool(&mut vector, "symptoms_ear_fullness", answers.ear_fullness);

    // Medical history
    for (name, value) in history_fields(answers) {
        set_bool(&mut vector, name, value);
    }

    // Bedside exam findings
    for (name, value) in exam_fields(answers) {
        set_bool(&mut vector, name, value);
    }

    debug!(
        "Mapped answer set: {} of {} features answered",
        vector.values.len() - vector.missing_count(),
        vector.values.len()
    );

    vector
}

/// Write one duration coding scheme: ordinal code plus four mutually
/// exclusive indicators under the given prefix.
fn write_duration_scheme(vector: &mut FeatureVector, prefix: &str, bucket: DurationBucket) {
    vector.set_by_name(prefix, bucket.ordinal());
    for candidate in DurationBucket::ALL {
        let name = format!("{}{}", prefix, candidate.indicator_suffix());
        let hit = if candidate == bucket { 1.0 } else { 0.0 };
        vector.set_by_name(&name, hit);
    }
}

fn set_bool(vector: &mut FeatureVector, name: &str, value: Option<bool>) {
    if let Some(v) = value {
        vector.set_by_name(name, if v { 1.0 } else { 0.0 });
    }
}

fn set_num(vector: &mut FeatureVector, name: &str, value: Option<f64>) {
    if let Some(v) = value {
        vector.set_by_name(name, v);
    }
}

fn history_fields(answers: &ClinicalAnswers) -> [(&'static str, Option<bool>); 24] {
    let h = &answers.history;
    [
        ("history_dm", h.dm),
        ("history_htn", h.htn),
        ("history_pul_tbc", h.pul_tbc),
        ("history_asthma", h.asthma),
        ("history_kidney", h.kidney),
        ("history_entop", h.entop),
        ("history_trauma", h.trauma),
        ("history_ear_disease", h.ear_disease),
        ("history_neckop", h.neckop),
        ("history_brain_disease", h.brain_disease),
        ("history_metabolic_disease", h.metabolic_disease),
        ("history_coronary_disease", h.coronary_disease),
        ("history_stomach", h.stomach),
        ("history_bph", h.bph),
        ("history_gynecologic", h.gynecologic),
        ("history_eye_disease", h.eye_disease),
        ("history_psychiatric", h.psychiatric),
        ("history_thyroid_disease", h.thyroid_disease),
        ("history_pci", h.pci),
        ("history_abdominalop", h.abdominalop),
        ("history_respiratory_disease", h.respiratory_disease),
        ("history_orthopedicop", h.orthopedicop),
        ("history_ra", h.ra),
        ("history_autoimmune_disease", h.autoimmune_disease),
    ]
}

fn exam_fields(answers: &ClinicalAnswers) -> [(&'static str, Option<bool>); 20] {
    let e = &answers.exam;
    [
        ("etc_sn_right", e.sn_right),
        ("etc_sn_left", e.sn_left),
        ("etc_gaze_right", e.gaze_right),
        ("etc_gaze_left", e.gaze_left),
        ("etc_dht_right", e.dht_right),
        ("etc_dht_left", e.dht_left),
        ("etc_rht_right", e.rht_right),
        ("etc_rht_left", e.rht_left),
        ("etc_gn_right", e.gn_right),
        ("etc_gn_left", e.gn_left),
        ("etc_hit_right", e.hit_right),
        ("etc_hit_left", e.hit_left),
        ("etc_hsn_right", e.hsn_right),
        ("etc_hsn_left", e.hsn_left),
        ("etc_htt_right", e.htt_right),
        ("etc_htt_left", e.htt_left),
        ("etc_skew_deviation_right", e.skew_deviation_right),
        ("etc_skew_deviation_left", e.skew_deviation_left),
        ("etc_weber_right", e.weber_right),
        ("etc_weber_left", e.weber_left),
    ]
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::{FEATURE_COUNT, FEATURE_LAYOUT};
    use crate::logic::intake::answers::{AttackFrequency, ExamAnswers, HistoryAnswers, Sex};

    fn full_answers() -> ClinicalAnswers {
        let yes = Some(true);
        ClinicalAnswers {
            patient_name: Some("test".to_string()),
            age: Some(60.0),
            sex: Some(Sex::Male),
            true_vertigo: yes,
            dizziness_ongoing: Some(false),
            days_since_recent_attack: Some(2.0),
            frequency: Some(AttackFrequency::TwoToThree),
            recurrence: yes,
            duration: Some(DurationBucket::SeveralHours),
            remote_onset: Some(RemoteOnset::Within30Days),
            nausea: yes,
            vomiting: Some(false),
            headache: Some(false),
            black_out: Some(false),
            agg_position_change: yes,
            agg_head_rotation: Some(false),
            agg_eyes_moving: Some(false),
            agg_moving: yes,
            agg_no_moving: Some(false),
            rel_rest: yes,
            rel_eyes_closed: Some(false),
            hearing_impairment: Some(false),
            tinnitus: Some(false),
            ear_fullness: Some(false),
            history: HistoryAnswers {
                dm: Some(true),
                htn: Some(false),
                pul_tbc: Some(false),
                asthma: Some(false),
                kidney: Some(false),
                entop: Some(false),
                trauma: Some(false),
                ear_disease: Some(false),
                neckop: Some(false),
                brain_disease: Some(false),
                metabolic_disease: Some(false),
                coronary_disease: Some(false),
                stomach: Some(false),
                bph: Some(false),
                gynecologic: Some(false),
                eye_disease: Some(false),
                psychiatric: Some(false),
                thyroid_disease: Some(false),
                pci: Some(false),
                abdominalop: Some(false),
                respiratory_disease: Some(false),
                orthopedicop: Some(false),
                ra: Some(false),
                autoimmune_disease: Some(false),
            },
            exam: ExamAnswers {
                sn_right: Some(true),
                sn_left: Some(false),
                gaze_right: Some(false),
                gaze_left: Some(false),
                dht_right: Some(false),
                dht_left: Some(false),
                rht_right: Some(false),
                rht_left: Some(false),
                gn_right: Some(false),
                gn_left: Some(false),
                hit_right: Some(false),
                hit_left: Some(false),
                hsn_right: Some(false),
                hsn_left: Some(false),
                htt_right: Some(false),
                htt_left: Some(false),
                skew_deviation_right: Some(false),
                skew_deviation_left: Some(false),
                weber_right: Some(false),
                weber_left: Some(false),
            },
        }
    }

    #[test]
    fn test_empty_answers_all_missing() {
        let vector = map_answers(&ClinicalAnswers::default());
        assert_eq!(vector.values.len(), FEATURE_COUNT);
        assert_eq!(vector.missing_count(), FEATURE_COUNT);
    }

    #[test]
    fn test_full_answers_complete_vector() {
        let vector = map_answers(&full_answers());
        assert!(vector.is_complete(), "every schema feature should be answered");
        assert_eq!(vector.values.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_schema_order_preserved() {
        let vector = map_answers(&full_answers());
        // The vector is indexed by the canonical layout itself
        assert_eq!(vector.feature_names(), FEATURE_LAYOUT);
        assert!(vector.validate().is_ok());
    }

    /// Scenario from the intake contract: age 45, female, true vertigo,
    /// duration "several minutes", recurrent, everything else unanswered.
    #[test]
    fn test_minimal_scenario_mapping() {
        let answers = ClinicalAnswers {
            age: Some(45.0),
            sex: Some(Sex::Female),
            true_vertigo: Some(true),
            duration: Some(DurationBucket::SeveralMinutes),
            recurrence: Some(true),
            ..Default::default()
        };
        let vector = map_answers(&answers);

        assert_eq!(vector.get_by_name("age"), Some(45.0));
        assert_eq!(vector.get_by_name("sex"), Some(1.0));
        assert_eq!(vector.get_by_name("symptoms_true_vertigo"), Some(1.0));
        assert_eq!(vector.get_by_name("symptoms_recurrence"), Some(1.0));
        assert_eq!(vector.get_by_name("symptoms_duration_minutes_cat_gen"), Some(2.0));
        assert_eq!(
            vector.get_by_name("symptoms_duration_minutes_cat_gen_is_several_min"),
            Some(1.0)
        );
        assert_eq!(
            vector.get_by_name("symptoms_duration_minutes_cat_gen_is_several_sec"),
            Some(0.0)
        );
        assert_eq!(
            vector.get_by_name("symptoms_duration_minutes_cat_gen_is_several_hours"),
            Some(0.0)
        );
        assert_eq!(
            vector.get_by_name("symptoms_duration_minutes_cat_gen_is_several_days"),
            Some(0.0)
        );
        assert_eq!(vector.get_by_name("symptoms_duration_minutes"), Some(5.0));

        // History and exam were never asked
        assert_eq!(vector.get_by_name("history_dm"), None);
        assert_eq!(vector.get_by_name("etc_sn_right"), None);
        // Unanswered checkboxes stay missing, not zero
        assert_eq!(vector.get_by_name("symptoms_nausea"), None);
    }

    #[test]
    fn test_duration_indicators_mutually_exclusive() {
        for bucket in DurationBucket::ALL {
            let answers = ClinicalAnswers { duration: Some(bucket), ..Default::default() };
            let vector = map_answers(&answers);
            for prefix in DURATION_SCHEME_PREFIXES {
                let ones: usize = DurationBucket::ALL
                    .iter()
                    .filter(|c| {
                        let name = format!("{}{}", prefix, c.indicator_suffix());
                        vector.get_by_name(&name) == Some(1.0)
                    })
                    .count();
                assert_eq!(ones, 1, "exactly one indicator set for {:?}/{}", bucket, prefix);
            }
        }
    }

    #[test]
    fn test_parallel_duration_schemes_identical() {
        let answers = ClinicalAnswers {
            duration: Some(DurationBucket::SeveralDays),
            ..Default::default()
        };
        let vector = map_answers(&answers);

        assert_eq!(
            vector.get_by_name("symptoms_duration_minutes_cat_gen"),
            vector.get_by_name("symptoms_duration_minutes_cat_20m"),
        );
        for candidate in DurationBucket::ALL {
            let gen = format!("symptoms_duration_minutes_cat_gen{}", candidate.indicator_suffix());
            let m20 = format!("symptoms_duration_minutes_cat_20m{}", candidate.indicator_suffix());
            assert_eq!(vector.get_by_name(&gen), vector.get_by_name(&m20));
        }
    }

    #[test]
    fn test_remote_onset_indicators_mutually_exclusive() {
        for onset in RemoteOnset::ALL {
            let answers = ClinicalAnswers { remote_onset: Some(onset), ..Default::default() };
            let vector = map_answers(&answers);
            let ones: usize = RemoteOnset::ALL
                .iter()
                .filter(|c| vector.get_by_name(c.indicator_feature()) == Some(1.0))
                .count();
            assert_eq!(ones, 1);
            assert_eq!(vector.get_by_name("symptom_remote_cat"), Some(onset.ordinal()));
        }
    }

    #[test]
    fn test_combined_position_change_lockstep() {
        for value in [Some(true), Some(false), None] {
            let answers = ClinicalAnswers { agg_position_change: value, ..Default::default() };
            let vector = map_answers(&answers);
            assert_eq!(
                vector.get_by_name("symptoms_agg_factor_position_change"),
                vector.get_by_name("symptoms_agg_factor_position_change_combined"),
            );
        }
    }

    #[test]
    fn test_explicit_no_maps_to_zero() {
        let answers = ClinicalAnswers { nausea: Some(false), ..Default::default() };
        let vector = map_answers(&answers);
        assert_eq!(vector.get_by_name("symptoms_nausea"), Some(0.0));
        assert_eq!(vector.get_by_name("symptoms_vomiting"), None);
    }
}
