//! Clinical Answers - Typed form input
//!
//! The structured answer set collected by the presentation layer for one
//! prediction request. Created fresh per request, never persisted.
//!
//! Every checkbox is an `Option<bool>`: `None` means the question was not
//! asked, `Some(false)` means the patient explicitly denied it. The two
//! states map to different feature values downstream.

use serde::{Deserialize, Serialize};

// ============================================================================
// CODED SELECTIONS
// ============================================================================

/// Patient sex. Coded 1 = female, 0 = male (training-time convention).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Female,
    Male,
}

impl Sex {
    pub fn code(self) -> f64 {
        match self {
            Sex::Female => 1.0,
            Sex::Male => 0.0,
        }
    }
}

/// Duration-of-attack bucket. Ordinal codes 1-4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationBucket {
    SeveralSeconds,
    SeveralMinutes,
    SeveralHours,
    SeveralDays,
}

impl DurationBucket {
    pub const ALL: [DurationBucket; 4] = [
        DurationBucket::SeveralSeconds,
        DurationBucket::SeveralMinutes,
        DurationBucket::SeveralHours,
        DurationBucket::SeveralDays,
    ];

    pub fn ordinal(self) -> f64 {
        match self {
            DurationBucket::SeveralSeconds => 1.0,
            DurationBucket::SeveralMinutes => 2.0,
            DurationBucket::SeveralHours => 3.0,
            DurationBucket::SeveralDays => 4.0,
        }
    }

    /// Continuous duration estimate in minutes for this bucket
    pub fn minutes(self) -> f64 {
        match self {
            DurationBucket::SeveralSeconds => 0.5,
            DurationBucket::SeveralMinutes => 5.0,
            DurationBucket::SeveralHours => 120.0,
            DurationBucket::SeveralDays => 1440.0,
        }
    }

    /// Indicator-feature suffix for this bucket
    pub fn indicator_suffix(self) -> &'static str {
        match self {
            DurationBucket::SeveralSeconds => "_is_several_sec",
            DurationBucket::SeveralMinutes => "_is_several_min",
            DurationBucket::SeveralHours => "_is_several_hours",
            DurationBucket::SeveralDays => "_is_several_days",
        }
    }
}

/// When the patient's previous dizziness episodes occurred. Ordinal 0-3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteOnset {
    FirstAttack,
    Within30Days,
    Within1Year,
    OverOneYear,
}

impl RemoteOnset {
    pub const ALL: [RemoteOnset; 4] = [
        RemoteOnset::FirstAttack,
        RemoteOnset::Within30Days,
        RemoteOnset::Within1Year,
        RemoteOnset::OverOneYear,
    ];

    pub fn ordinal(self) -> f64 {
        match self {
            RemoteOnset::FirstAttack => 0.0,
            RemoteOnset::Within30Days => 1.0,
            RemoteOnset::Within1Year => 2.0,
            RemoteOnset::OverOneYear => 3.0,
        }
    }

    /// Indicator feature name for this category
    pub fn indicator_feature(self) -> &'static str {
        match self {
            RemoteOnset::FirstAttack => "symptom_remote_cat_is_1st_attack",
            RemoteOnset::Within30Days => "symptom_remote_cat_is_within_30days",
            RemoteOnset::Within1Year => "symptom_remote_cat_is_within_1years",
            RemoteOnset::OverOneYear => "symptom_remote_cat_is_over_1year",
        }
    }
}

/// How many attacks the patient reports. Ordinal codes 1-5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackFrequency {
    Once,
    TwoToThree,
    FourToFive,
    SixToTen,
    MoreThanTen,
}

impl AttackFrequency {
    pub fn code(self) -> f64 {
        match self {
            AttackFrequency::Once => 1.0,
            AttackFrequency::TwoToThree => 2.0,
            AttackFrequency::FourToFive => 3.0,
            AttackFrequency::SixToTen => 4.0,
            AttackFrequency::MoreThanTen => 5.0,
        }
    }
}

// ============================================================================
// ANSWER SET
// ============================================================================

/// Medical history checkboxes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryAnswers {
    pub dm: Option<bool>,
    pub htn: Option<bool>,
    pub pul_tbc: Option<bool>,
    pub asthma: Option<bool>,
    pub kidney: Option<bool>,
    pub entop: Option<bool>,
    pub trauma: Option<bool>,
    pub ear_disease: Option<bool>,
    pub neckop: Option<bool>,
    pub brain_disease: Option<bool>,
    pub metabolic_disease: Option<bool>,
    pub coronary_disease: Option<bool>,
    pub stomach: Option<bool>,
    pub bph: Option<bool>,
    pub gynecologic: Option<bool>,
    pub eye_disease: Option<bool>,
    pub psychiatric: Option<bool>,
    pub thyroid_disease: Option<bool>,
    pub pci: Option<bool>,
    pub abdominalop: Option<bool>,
    pub respiratory_disease: Option<bool>,
    pub orthopedicop: Option<bool>,
    pub ra: Option<bool>,
    pub autoimmune_disease: Option<bool>,
}

/// Bedside exam findings (right/left pairs)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExamAnswers {
    pub sn_right: Option<bool>,
    pub sn_left: Option<bool>,
    pub gaze_right: Option<bool>,
    pub gaze_left: Option<bool>,
    pub dht_right: Option<bool>,
    pub dht_left: Option<bool>,
    pub rht_right: Option<bool>,
    pub rht_left: Option<bool>,
    pub gn_right: Option<bool>,
    pub gn_left: Option<bool>,
    pub hit_right: Option<bool>,
    pub hit_left: Option<bool>,
    pub hsn_right: Option<bool>,
    pub hsn_left: Option<bool>,
    pub htt_right: Option<bool>,
    pub htt_left: Option<bool>,
    pub skew_deviation_right: Option<bool>,
    pub skew_deviation_left: Option<bool>,
    pub weber_right: Option<bool>,
    pub weber_left: Option<bool>,
}

/// One complete form submission. All fields optional: the mapper is total
/// and turns any partial answer set into a full feature vector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicalAnswers {
    /// Display-only; never enters the feature vector
    pub patient_name: Option<String>,
    pub age: Option<f64>,
    pub sex: Option<Sex>,

    // Attack pattern
    pub true_vertigo: Option<bool>,
    pub dizziness_ongoing: Option<bool>,
    pub days_since_recent_attack: Option<f64>,
    pub frequency: Option<AttackFrequency>,
    pub recurrence: Option<bool>,
    pub duration: Option<DurationBucket>,
    pub remote_onset: Option<RemoteOnset>,

    // Accompanying symptoms
    pub nausea: Option<bool>,
    pub vomiting: Option<bool>,
    pub headache: Option<bool>,
    pub black_out: Option<bool>,

    // Aggravating / relieving factors
    pub agg_position_change: Option<bool>,
    pub agg_head_rotation: Option<bool>,
    pub agg_eyes_moving: Option<bool>,
    pub agg_moving: Option<bool>,
    pub agg_no_moving: Option<bool>,
    pub rel_rest: Option<bool>,
    pub rel_eyes_closed: Option<bool>,

    // Otologic symptoms
    pub hearing_impairment: Option<bool>,
    pub tinnitus: Option<bool>,
    pub ear_fullness: Option<bool>,

    pub history: HistoryAnswers,
    pub exam: ExamAnswers,
}

// ============================================================================
// FORM-LAYER VALIDATION
// ============================================================================

/// Age range accepted by the intake form
pub const AGE_RANGE: std::ops::RangeInclusive<f64> = 10.0..=100.0;

/// Days-since-onset range accepted by the intake form
pub const RECENCY_RANGE: std::ops::RangeInclusive<f64> = 0.0..=180.0;

/// Rejected numeric entry. Range checks belong to the form layer; the
/// mapper itself never fails.
#[derive(Debug, Clone)]
pub enum AnswerValidationError {
    AgeOutOfRange(f64),
    RecencyOutOfRange(f64),
    NonFinite(&'static str),
}

impl std::fmt::Display for AnswerValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AgeOutOfRange(v) => write!(f, "Age {} outside accepted range 10-100", v),
            Self::RecencyOutOfRange(v) => {
                write!(f, "Days since recent attack {} outside accepted range 0-180", v)
            }
            Self::NonFinite(field) => write!(f, "Non-finite value for {}", field),
        }
    }
}

impl std::error::Error for AnswerValidationError {}

impl ClinicalAnswers {
    /// Range-check the free numeric entries
    pub fn validate(&self) -> Result<(), AnswerValidationError> {
        if let Some(age) = self.age {
            if !age.is_finite() {
                return Err(AnswerValidationError::NonFinite("age"));
            }
            if !AGE_RANGE.contains(&age) {
                return Err(AnswerValidationError::AgeOutOfRange(age));
            }
        }
        if let Some(days) = self.days_since_recent_attack {
            if !days.is_finite() {
                return Err(AnswerValidationError::NonFinite("days_since_recent_attack"));
            }
            if !RECENCY_RANGE.contains(&days) {
                return Err(AnswerValidationError::RecencyOutOfRange(days));
            }
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
