//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! To change the default artifact source, only edit this file.

/// Default model artifact source URL
///
/// This is the fallback URL when no environment variable is set.
/// Artifacts are addressed as `<base>/<artifact_id>.json`.
pub const DEFAULT_MODEL_SOURCE_URL: &str = "https://models.vertigo-dx.example.org/v1";

/// Default artifact fetch timeout (seconds)
pub const DEFAULT_FETCH_TIMEOUT: u64 = 30;

/// Default number of retries for transient fetch failures
pub const DEFAULT_FETCH_RETRIES: u32 = 3;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Vertigo-DX";

/// Stable per-disease artifact identifiers at the blob store.
/// Order matches `DiseaseLabel::ALL`.
pub const DEFAULT_ARTIFACT_IDS: [(&str, &str); 5] = [
    ("BPPV", "label_bppv_model"),
    ("VN", "label_vn_model"),
    ("SSNHL", "label_ssnhl_model"),
    ("Meniere", "label_meniere_model"),
    ("Others", "label_others_model"),
];

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get model source URL from environment or use default
pub fn get_model_source_url() -> String {
    std::env::var("MODEL_SOURCE_URL")
        .unwrap_or_else(|_| DEFAULT_MODEL_SOURCE_URL.to_string())
}

/// Get local model directory override, if set (offline mode)
pub fn get_model_source_dir() -> Option<String> {
    std::env::var("MODEL_SOURCE_DIR").ok().filter(|s| !s.is_empty())
}

/// Get artifact fetch timeout from environment or use default
pub fn get_fetch_timeout() -> u64 {
    std::env::var("MODEL_FETCH_TIMEOUT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_FETCH_TIMEOUT)
}

/// Get artifact fetch retry count from environment or use default
pub fn get_fetch_retries() -> u32 {
    std::env::var("MODEL_FETCH_RETRIES")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_FETCH_RETRIES)
}

/// Check if the on-disk artifact cache is enabled
pub fn is_artifact_cache_enabled() -> bool {
    std::env::var("MODEL_CACHE_ENABLED")
        .map(|s| s.to_lowercase() != "false" && s != "0")
        .unwrap_or(true)
}
