//! Feature Vector - Core data structure for model input
//!
//! **Versioned feature vector with layout validation**
//!
//! Uses centralized layout from `layout.rs` for:
//! - Consistent feature ordering
//! - Version tracking
//! - Layout hash for compatibility checks
//!
//! A value of `None` means the question was never asked. This is distinct
//! from 0.0 ("asked, answer was no"); trained models carry their own fill
//! value for the missing state, so the sentinel is never collapsed to zero
//! here.

use serde::{Deserialize, Serialize};
use super::layout::{
    FEATURE_COUNT, FEATURE_VERSION, FEATURE_LAYOUT,
    layout_hash, validate_layout, LayoutMismatchError,
};

// ============================================================================
// VERSIONED FEATURE VECTOR
// ============================================================================

/// Versioned Feature Vector with layout metadata
///
/// This struct MUST be used for all feature data to ensure compatibility.
/// Missing answers serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Feature layout version
    pub version: u8,
    /// CRC32 hash of the feature layout (for mismatch detection)
    pub layout_hash: u32,
    /// Feature values in order defined by FEATURE_LAYOUT; `None` = not asked
    pub values: Vec<Option<f64>>,
}

impl FeatureVector {
    /// Create a new all-missing feature vector with current version
    pub fn new() -> Self {
        Self {
            version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            values: vec![None; FEATURE_COUNT],
        }
    }

    /// Create from raw values with current version
    pub fn from_values(values: Vec<Option<f64>>) -> Self {
        let mut vector = Self::new();
        for (i, v) in values.into_iter().take(FEATURE_COUNT).enumerate() {
            vector.values[i] = v;
        }
        vector
    }

    /// Get feature by index
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }

    /// Get feature by name
    pub fn get_by_name(&self, name: &str) -> Option<f64> {
        super::layout::feature_index(name).and_then(|i| self.get(i))
    }

    /// Set feature by index
    pub fn set(&mut self, index: usize, value: f64) {
        if index < FEATURE_COUNT {
            self.values[index] = Some(value);
        }
    }

    /// Set feature by name
    pub fn set_by_name(&mut self, name: &str, value: f64) -> bool {
        if let Some(index) = super::layout::feature_index(name) {
            self.set(index, value);
            true
        } else {
            false
        }
    }

    /// Clear a feature back to the missing state
    pub fn clear(&mut self, index: usize) {
        if index < FEATURE_COUNT {
            self.values[index] = None;
        }
    }

    /// Number of features still missing
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }

    /// True when every feature has an answered value
    pub fn is_complete(&self) -> bool {
        self.missing_count() == 0
    }

    /// Validate that this vector is compatible with current layout
    pub fn validate(&self) -> Result<(), LayoutMismatchError> {
        validate_layout(self.version, self.layout_hash)
    }

    /// Check if this vector is compatible with current layout
    pub fn is_compatible(&self) -> bool {
        self.validate().is_ok() && self.values.len() == FEATURE_COUNT
    }

    /// Get feature names for this vector
    pub fn feature_names(&self) -> &'static [&'static str] {
        FEATURE_LAYOUT
    }

    /// Convert to JSON-serializable format for logging
    pub fn to_log_entry(&self) -> serde_json::Value {
        serde_json::json!({
            "feature_version": self.version,
            "layout_hash": self.layout_hash,
            "missing_count": self.missing_count(),
            "named_values": FEATURE_LAYOUT.iter()
                .zip(self.values.iter())
                .map(|(name, value)| (name.to_string(), *value))
                .collect::<std::collections::HashMap<_, _>>(),
        })
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_vector_new() {
        let vector = FeatureVector::new();
        assert_eq!(vector.version, FEATURE_VERSION);
        assert_eq!(vector.layout_hash, layout_hash());
        assert_eq!(vector.values.len(), FEATURE_COUNT);
        assert_eq!(vector.missing_count(), FEATURE_COUNT);
        assert!(!vector.is_complete());
    }

    #[test]
    fn test_feature_vector_set_by_name() {
        let mut vector = FeatureVector::new();
        assert!(vector.set_by_name("age", 45.0));
        assert_eq!(vector.get_by_name("age"), Some(45.0));
        assert_eq!(vector.missing_count(), FEATURE_COUNT - 1);

        assert!(!vector.set_by_name("nonexistent", 0.0));
    }

    #[test]
    fn test_missing_is_not_zero() {
        let mut vector = FeatureVector::new();
        vector.set_by_name("symptoms_nausea", 0.0);

        // Answered-no and never-asked must stay distinguishable
        assert_eq!(vector.get_by_name("symptoms_nausea"), Some(0.0));
        assert_eq!(vector.get_by_name("symptoms_vomiting"), None);
    }

    #[test]
    fn test_clear_restores_missing() {
        let mut vector = FeatureVector::new();
        vector.set(0, 3.0);
        assert_eq!(vector.get(0), Some(3.0));
        vector.clear(0);
        assert_eq!(vector.get(0), None);
    }

    #[test]
    fn test_feature_vector_validation() {
        let vector = FeatureVector::new();
        assert!(vector.is_compatible());
        assert!(vector.validate().is_ok());
    }

    #[test]
    fn test_serde_null_roundtrip() {
        let mut vector = FeatureVector::new();
        vector.set_by_name("age", 45.0);

        let json = serde_json::to_string(&vector).unwrap();
        let back: FeatureVector = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vector);
        assert_eq!(back.get_by_name("sex"), None);
    }

    #[test]
    fn test_to_log_entry() {
        let mut vector = FeatureVector::new();
        vector.set_by_name("age", 45.0);

        let log = vector.to_log_entry();
        assert_eq!(log["feature_version"], FEATURE_VERSION);
        assert_eq!(log["missing_count"], (FEATURE_COUNT - 1) as u64);
    }
}
