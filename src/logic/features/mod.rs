//! Features Module - Canonical Schema & Feature Vector
//!
//! `layout.rs` owns the ordered 82-feature schema shared by all five
//! disease models; `vector.rs` is the versioned value container with an
//! explicit missing state.

pub mod layout;
pub mod vector;

// Re-export common types
pub use layout::{
    FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION,
    feature_index, feature_name, layout_hash, validate_layout,
    LayoutInfo, LayoutMismatchError,
};
pub use vector::FeatureVector;
