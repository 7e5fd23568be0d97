//! Feature Layout - Centralized Feature Schema
//!
//! **CRITICAL: This file controls the feature schema**
//!
//! ## Rules (NEVER break these):
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION
//!
//! Column order is part of every trained model's input contract. Any
//! vector built elsewhere must be reindexed to this exact order before
//! it reaches a model.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
/// MUST be incremented when layout changes
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Feature names in exact order they appear in the vector
/// This is the SINGLE SOURCE OF TRUTH for feature layout
pub const FEATURE_LAYOUT: &[&str] = &[
    // === Attack pattern (0-7) ===
    "symptoms_frequency",                              // 0: attack count bucket, ordinal 1-5
    "symptoms_recurrence",                             // 1: recurrent dizziness
    "symptom_recent",                                  // 2: days since most recent attack
    "symptom_remote_cat",                              // 3: remote onset, ordinal 0-3
    "symptom_remote_cat_is_1st_attack",                // 4
    "symptom_remote_cat_is_within_30days",             // 5
    "symptom_remote_cat_is_within_1years",             // 6
    "symptom_remote_cat_is_over_1year",                // 7
    // === Vertigo character & duration (8-20) ===
    "symptoms_true_vertigo",                           // 8: spinning vertigo
    "symptoms_dizziness_duration_ongoing",             // 9: still ongoing at presentation
    "symptoms_duration_minutes",                       // 10: continuous duration in minutes
    "symptoms_duration_minutes_cat_gen",               // 11: duration bucket, ordinal 1-4
    "symptoms_duration_minutes_cat_gen_is_several_sec",    // 12
    "symptoms_duration_minutes_cat_gen_is_several_min",    // 13
    "symptoms_duration_minutes_cat_gen_is_several_hours",  // 14
    "symptoms_duration_minutes_cat_gen_is_several_days",   // 15
    "symptoms_duration_minutes_cat_20m",               // 16: legacy 20-minute coding scheme
    "symptoms_duration_minutes_cat_20m_is_several_sec",    // 17
    "symptoms_duration_minutes_cat_20m_is_several_min",    // 18
    "symptoms_duration_minutes_cat_20m_is_several_hours",  // 19
    "symptoms_duration_minutes_cat_20m_is_several_days",   // 20
    // === Accompanying symptoms (21-24) ===
    "symptoms_nausea",                                 // 21
    "symptoms_vomiting",                               // 22
    "symptoms_headache",                               // 23
    "symptoms_black_out",                              // 24
    // === Aggravating / relieving factors (25-32) ===
    "symptoms_agg_factor_position_change",             // 25
    "symptoms_agg_factor_head_rotation",               // 26
    "symptoms_agg_factor_eyes_moving",                 // 27
    "symptoms_agg_factor_moving",                      // 28
    "symptoms_agg_factor_no_moving",                   // 29
    "symptoms_agg_factor_position_change_combined",    // 30: lockstep alias of index 25
    "symptoms_rel_factor_rest",                        // 31
    "symptoms_rel_factor_eyes_closed",                 // 32
    // === Otologic symptoms (33-35) ===
    "symptoms_hearing_impairment_combined",            // 33
    "symptoms_tinnitus",                               // 34
    "symptoms_ear_fullness",                           // 35
    // === Medical history (36-59) ===
    "history_dm",                                      // 36
    "history_htn",                                     // 37
    "history_pul_tbc",                                 // 38
    "history_asthma",                                  // 39
    "history_kidney",                                  // 40
    "history_entop",                                   // 41
    "history_trauma",                                  // 42
    "history_ear_disease",                             // 43
    "history_neckop",                                  // 44
    "history_brain_disease",                           // 45
    "history_metabolic_disease",                       // 46
    "history_coronary_disease",                        // 47
    "history_stomach",                                 // 48
    "history_bph",                                     // 49
    "history_gynecologic",                             // 50
    "history_eye_disease",                             // 51
    "history_psychiatric",                             // 52
    "history_thyroid_disease",                         // 53
    "history_pci",                                     // 54
    "history_abdominalop",                             // 55
    "history_respiratory_disease",                     // 56
    "history_orthopedicop",                            // 57
    "history_ra",                                      // 58
    "history_autoimmune_disease",                      // 59
    // === Bedside exam findings (60-79) ===
    "etc_sn_right",                                    // 60: spontaneous nystagmus
    "etc_sn_left",                                     // 61
    "etc_gaze_right",                                  // 62: gaze-evoked nystagmus
    "etc_gaze_left",                                   // 63
    "etc_dht_right",                                   // 64: Dix-Hallpike test
    "etc_dht_left",                                    // 65
    "etc_rht_right",                                   // 66: supine roll test
    "etc_rht_left",                                    // 67
    "etc_gn_right",                                    // 68
    "etc_gn_left",                                     // 69
    "etc_hit_right",                                   // 70: head impulse test
    "etc_hit_left",                                    // 71
    "etc_hsn_right",                                   // 72: head-shaking nystagmus
    "etc_hsn_left",                                    // 73
    "etc_htt_right",                                   // 74
    "etc_htt_left",                                    // 75
    "etc_skew_deviation_right",                        // 76
    "etc_skew_deviation_left",                         // 77
    "etc_weber_right",                                 // 78
    "etc_weber_left",                                  // 79
    // === Demographics (80-81) ===
    "age",                                             // 80
    "sex",                                             // 81: 1 = female, 0 = male
];

/// Total number of features
/// IMPORTANT: Must match FEATURE_LAYOUT.len()!
pub const FEATURE_COUNT: usize = 82;

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// Compute CRC32 hash of the feature layout
/// Used to detect layout mismatches between a model artifact and this build
pub fn compute_layout_hash() -> u32 {
    let mut hasher = Hasher::new();

    // Include version in hash
    hasher.update(&[FEATURE_VERSION]);

    // Hash all feature names in order
    for name in FEATURE_LAYOUT {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

/// Get layout hash (inputs are const, so this is stable for the build)
pub fn layout_hash() -> u32 {
    compute_layout_hash()
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Complete layout information for serialization/logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for LayoutInfo {
    fn default() -> Self {
        Self::current()
    }
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Error when feature layout doesn't match expected
#[derive(Debug, Clone)]
pub struct LayoutMismatchError {
    pub expected_version: u8,
    pub expected_hash: u32,
    pub actual_version: u8,
    pub actual_hash: u32,
}

impl std::fmt::Display for LayoutMismatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Feature layout mismatch: expected v{} (hash: {:08x}), got v{} (hash: {:08x})",
            self.expected_version,
            self.expected_hash,
            self.actual_version,
            self.actual_hash
        )
    }
}

impl std::error::Error for LayoutMismatchError {}

/// Validate that incoming data matches current layout
pub fn validate_layout(incoming_version: u8, incoming_hash: u32) -> Result<(), LayoutMismatchError> {
    let current_hash = layout_hash();

    if incoming_version != FEATURE_VERSION || incoming_hash != current_hash {
        return Err(LayoutMismatchError {
            expected_version: FEATURE_VERSION,
            expected_hash: current_hash,
            actual_version: incoming_version,
            actual_hash: incoming_hash,
        });
    }

    Ok(())
}

/// Check if layout is compatible (same version, same hash)
pub fn is_layout_compatible(version: u8, hash: u32) -> bool {
    version == FEATURE_VERSION && hash == layout_hash()
}

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

/// Get feature index by name (O(n) but lookups are rare outside load time)
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

/// Get feature name by index
pub fn feature_name(index: usize) -> Option<&'static str> {
    FEATURE_LAYOUT.get(index).copied()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_feature_count() {
        assert_eq!(FEATURE_COUNT, 82);
        assert_eq!(FEATURE_LAYOUT.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_feature_names_unique() {
        let unique: HashSet<_> = FEATURE_LAYOUT.iter().collect();
        assert_eq!(unique.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_layout_hash_consistency() {
        // Hash should be consistent across calls
        let hash1 = compute_layout_hash();
        let hash2 = compute_layout_hash();
        assert_eq!(hash1, hash2);
    }

    #[test]
    fn test_layout_hash_non_zero() {
        let hash = layout_hash();
        assert_ne!(hash, 0);
    }

    #[test]
    fn test_validate_layout_success() {
        let result = validate_layout(FEATURE_VERSION, layout_hash());
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_layout_version_mismatch() {
        let result = validate_layout(FEATURE_VERSION + 1, layout_hash());
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_layout_hash_mismatch() {
        let result = validate_layout(FEATURE_VERSION, layout_hash() ^ 1);
        assert!(result.is_err());
    }

    #[test]
    fn test_feature_index() {
        assert_eq!(feature_index("symptoms_frequency"), Some(0));
        assert_eq!(feature_index("symptoms_true_vertigo"), Some(8));
        assert_eq!(feature_index("age"), Some(80));
        assert_eq!(feature_index("sex"), Some(81));
        assert_eq!(feature_index("nonexistent"), None);
    }

    #[test]
    fn test_feature_name() {
        assert_eq!(feature_name(0), Some("symptoms_frequency"));
        assert_eq!(feature_name(81), Some("sex"));
        assert_eq!(feature_name(100), None);
    }

    #[test]
    fn test_parallel_duration_schemes_aligned() {
        // The two legacy duration coding schemes must expose the same
        // suffixes in the same relative order.
        let gen_base = feature_index("symptoms_duration_minutes_cat_gen").unwrap();
        let m20_base = feature_index("symptoms_duration_minutes_cat_20m").unwrap();
        for (offset, suffix) in ["", "_is_several_sec", "_is_several_min", "_is_several_hours", "_is_several_days"]
            .iter()
            .enumerate()
        {
            assert_eq!(
                feature_name(gen_base + offset).unwrap(),
                format!("symptoms_duration_minutes_cat_gen{}", suffix)
            );
            assert_eq!(
                feature_name(m20_base + offset).unwrap(),
                format!("symptoms_duration_minutes_cat_20m{}", suffix)
            );
        }
    }

    #[test]
    fn test_layout_info() {
        let info = LayoutInfo::current();
        assert_eq!(info.version, FEATURE_VERSION);
        assert_eq!(info.feature_count, FEATURE_COUNT);
        assert_eq!(info.feature_names.len(), FEATURE_COUNT);
    }
}
