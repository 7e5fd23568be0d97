//! Model Repository - load-once cache over an artifact store
//!
//! The five disease models are fetched from an external blob store,
//! verified, and kept as immutable shared state for the rest of the
//! process. Load semantics are all-or-nothing: the prediction engine needs
//! a complete comparison, so a partial set is never usable.
//!
//! Lifecycle is explicit: NotLoaded -> Loaded | Failed. `Loaded` is
//! permanent for the process; `Failed` may be retried by a later call.

use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::constants;
use super::{artifact::DiseaseModel, DiseaseLabel, LoadError};

// ============================================================================
// ARTIFACT STORE
// ============================================================================

/// Fetch capability over the external blob store. The store only moves
/// bytes; deserialization and validation happen in the repository.
pub trait ArtifactStore: Send + Sync {
    fn fetch(&self, artifact_id: &str) -> Result<Vec<u8>, LoadError>;
}

/// HTTP blob store. Transient transport failures retry with bounded
/// exponential backoff; HTTP status errors do not.
pub struct HttpStore {
    base_url: String,
    agent: ureq::Agent,
    max_retries: u32,
}

impl HttpStore {
    pub fn new(base_url: String, timeout_seconds: u64, max_retries: u32) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(timeout_seconds))
            .build();
        Self { base_url, agent, max_retries }
    }

    fn fetch_once(&self, url: &str) -> Result<Vec<u8>, FetchFailure> {
        let response = self.agent.get(url).call().map_err(|e| match e {
            ureq::Error::Status(code, _) => FetchFailure::Status(code),
            ureq::Error::Transport(t) => FetchFailure::Transport(t.to_string()),
        })?;
        let mut bytes = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut bytes)
            .map_err(|e| FetchFailure::Transport(e.to_string()))?;
        Ok(bytes)
    }
}

/// Internal split between retryable and permanent fetch failures
enum FetchFailure {
    Status(u16),
    Transport(String),
}

impl ArtifactStore for HttpStore {
    fn fetch(&self, artifact_id: &str) -> Result<Vec<u8>, LoadError> {
        let url = format!("{}/{}.json", self.base_url.trim_end_matches('/'), artifact_id);

        let mut attempt = 0u32;
        loop {
            match self.fetch_once(&url) {
                Ok(bytes) => return Ok(bytes),
                Err(FetchFailure::Status(code)) => {
                    return Err(LoadError::Fetch {
                        artifact_id: artifact_id.to_string(),
                        reason: format!("HTTP {}", code),
                    });
                }
                Err(FetchFailure::Transport(reason)) => {
                    if attempt >= self.max_retries {
                        return Err(LoadError::Fetch {
                            artifact_id: artifact_id.to_string(),
                            reason,
                        });
                    }
                    let backoff = Duration::from_millis(200 * (1 << attempt));
                    log::warn!(
                        "Transient fetch failure for '{}' (attempt {}): {}; retrying in {:?}",
                        artifact_id,
                        attempt + 1,
                        reason,
                        backoff
                    );
                    std::thread::sleep(backoff);
                    attempt += 1;
                }
            }
        }
    }
}

/// Local-directory store (offline mode and tests). Artifacts live as
/// `<dir>/<artifact_id>.json`.
pub struct DirStore {
    dir: PathBuf,
}

impl DirStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ArtifactStore for DirStore {
    fn fetch(&self, artifact_id: &str) -> Result<Vec<u8>, LoadError> {
        let path = self.dir.join(format!("{}.json", artifact_id));
        fs::read(&path).map_err(|e| LoadError::Fetch {
            artifact_id: artifact_id.to_string(),
            reason: format!("{}: {}", path.display(), e),
        })
    }
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// One artifact address: stable id plus an optional expected sha256 digest.
#[derive(Debug, Clone)]
pub struct ArtifactRef {
    pub id: String,
    pub sha256: Option<String>,
}

/// Repository configuration, defaulted from `constants` env helpers.
#[derive(Debug, Clone)]
pub struct RepositoryConfig {
    /// Artifact per disease, in `DiseaseLabel::ALL` order
    pub artifacts: Vec<(DiseaseLabel, ArtifactRef)>,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    /// On-disk cache for fetched bytes; `None` disables caching
    pub cache_dir: Option<PathBuf>,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        let artifacts = DiseaseLabel::ALL
            .iter()
            .zip(constants::DEFAULT_ARTIFACT_IDS.iter())
            .map(|(&label, &(_, id))| {
                (label, ArtifactRef { id: id.to_string(), sha256: None })
            })
            .collect();

        let cache_dir = if constants::is_artifact_cache_enabled() {
            dirs::cache_dir().map(|d| d.join("vertigo-dx").join("models"))
        } else {
            None
        };

        Self {
            artifacts,
            timeout_seconds: constants::get_fetch_timeout(),
            max_retries: constants::get_fetch_retries(),
            cache_dir,
        }
    }
}

impl RepositoryConfig {
    /// Config without the on-disk cache (tests, hermetic runs)
    pub fn without_cache(mut self) -> Self {
        self.cache_dir = None;
        self
    }
}

// ============================================================================
// MODEL SET
// ============================================================================

/// The complete, immutable set of five loaded models.
#[derive(Debug)]
pub struct ModelSet {
    models: Vec<(DiseaseLabel, DiseaseModel)>,
    loaded_at: DateTime<Utc>,
}

impl ModelSet {
    pub fn get(&self, label: DiseaseLabel) -> Option<&DiseaseModel> {
        self.models.iter().find(|(l, _)| *l == label).map(|(_, m)| m)
    }

    /// Iterate models in canonical label order
    pub fn iter(&self) -> impl Iterator<Item = (DiseaseLabel, &DiseaseModel)> {
        self.models.iter().map(|(l, m)| (*l, m))
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

// ============================================================================
// REPOSITORY
// ============================================================================

/// Explicit repository lifecycle
enum LoadState {
    NotLoaded,
    Loaded(Arc<ModelSet>),
    Failed { error: LoadError, at: DateTime<Utc> },
}

/// Status snapshot for operator visibility
#[derive(Debug, Clone, Serialize)]
pub struct RepositoryStatus {
    pub state: String,
    pub model_count: usize,
    pub loaded_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

pub struct ModelRepository {
    config: RepositoryConfig,
    state: RwLock<LoadState>,
}

impl ModelRepository {
    pub fn new(config: RepositoryConfig) -> Self {
        Self {
            config,
            state: RwLock::new(LoadState::NotLoaded),
        }
    }

    /// Idempotent load: the first successful call fetches and validates all
    /// five artifacts; every later call returns the same in-memory set. A
    /// previous failure does not poison the repository - the next call
    /// attempts the load again.
    pub fn load(&self, store: &dyn ArtifactStore) -> Result<Arc<ModelSet>, LoadError> {
        if let LoadState::Loaded(set) = &*self.state.read() {
            return Ok(Arc::clone(set));
        }

        let mut state = self.state.write();
        // Another caller may have finished while we waited for the lock
        if let LoadState::Loaded(set) = &*state {
            return Ok(Arc::clone(set));
        }

        match self.load_all(store) {
            Ok(set) => {
                let set = Arc::new(set);
                *state = LoadState::Loaded(Arc::clone(&set));
                log::info!("Model repository loaded: {} models", set.len());
                Ok(set)
            }
            Err(error) => {
                log::error!("Model repository load failed: {}", error);
                *state = LoadState::Failed { error: error.clone(), at: Utc::now() };
                Err(error)
            }
        }
    }

    /// Current lifecycle snapshot
    pub fn status(&self) -> RepositoryStatus {
        match &*self.state.read() {
            LoadState::NotLoaded => RepositoryStatus {
                state: "not_loaded".to_string(),
                model_count: 0,
                loaded_at: None,
                last_error: None,
            },
            LoadState::Loaded(set) => RepositoryStatus {
                state: "loaded".to_string(),
                model_count: set.len(),
                loaded_at: Some(set.loaded_at()),
                last_error: None,
            },
            LoadState::Failed { error, at } => RepositoryStatus {
                state: "failed".to_string(),
                model_count: 0,
                loaded_at: Some(*at),
                last_error: Some(error.to_string()),
            },
        }
    }

    /// Fetch, verify, and deserialize every artifact. Any failure aborts
    /// the whole load.
    fn load_all(&self, store: &dyn ArtifactStore) -> Result<ModelSet, LoadError> {
        let mut models = Vec::with_capacity(DiseaseLabel::ALL.len());

        for &label in &DiseaseLabel::ALL {
            let artifact_ref = self
                .config
                .artifacts
                .iter()
                .find(|(l, _)| *l == label)
                .map(|(_, r)| r)
                .ok_or_else(|| LoadError::MissingArtifact { disease: label.as_str().to_string() })?;

            let bytes = self.fetch_verified(store, artifact_ref)?;
            let model = DiseaseModel::from_bytes(&artifact_ref.id, &bytes)?;
            if model.disease() != label {
                return Err(LoadError::SchemaMismatch {
                    disease: label.as_str().to_string(),
                    reason: format!("artifact '{}' declares disease {}", artifact_ref.id, model.disease()),
                });
            }
            log::info!("Loaded model for {} from artifact '{}'", label, artifact_ref.id);
            models.push((label, model));
        }

        Ok(ModelSet { models, loaded_at: Utc::now() })
    }

    /// Fetch bytes through the on-disk cache and check the configured
    /// digest. Cache hits are only trusted when a digest is pinned.
    fn fetch_verified(
        &self,
        store: &dyn ArtifactStore,
        artifact_ref: &ArtifactRef,
    ) -> Result<Vec<u8>, LoadError> {
        if let (Some(dir), Some(expected)) = (&self.config.cache_dir, &artifact_ref.sha256) {
            let cached = dir.join(format!("{}-{}.json", artifact_ref.id, &expected[..8.min(expected.len())]));
            if let Ok(bytes) = fs::read(&cached) {
                if sha256_hex(&bytes) == *expected {
                    log::debug!("Artifact '{}' served from cache", artifact_ref.id);
                    return Ok(bytes);
                }
                log::warn!("Stale cache entry for '{}', refetching", artifact_ref.id);
            }
        }

        let bytes = store.fetch(&artifact_ref.id)?;

        if let Some(expected) = &artifact_ref.sha256 {
            let actual = sha256_hex(&bytes);
            if actual != *expected {
                return Err(LoadError::DigestMismatch {
                    artifact_id: artifact_ref.id.clone(),
                    expected: expected.clone(),
                    actual,
                });
            }
            if let Some(dir) = &self.config.cache_dir {
                let cached = dir.join(format!("{}-{}.json", artifact_ref.id, &expected[..8.min(expected.len())]));
                if let Err(e) = fs::create_dir_all(dir).and_then(|_| fs::write(&cached, &bytes)) {
                    log::warn!("Could not cache artifact '{}': {}", artifact_ref.id, e);
                }
            }
        }

        Ok(bytes)
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

// ============================================================================
// PROCESS-WIDE SINGLETON
// ============================================================================

static REPOSITORY: Lazy<ModelRepository> =
    Lazy::new(|| ModelRepository::new(RepositoryConfig::default()));

/// The process-wide repository (configuration from environment).
pub fn global() -> &'static ModelRepository {
    &REPOSITORY
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::model::artifact::test_artifact;

    fn write_store(dir: &std::path::Path, skip: Option<DiseaseLabel>) {
        for (&label, &(_, id)) in DiseaseLabel::ALL.iter().zip(constants::DEFAULT_ARTIFACT_IDS.iter()) {
            if Some(label) == skip {
                continue;
            }
            let artifact = test_artifact(label);
            let bytes = serde_json::to_vec(&artifact).unwrap();
            fs::write(dir.join(format!("{}.json", id)), bytes).unwrap();
        }
    }

    fn test_config() -> RepositoryConfig {
        RepositoryConfig::default().without_cache()
    }

    #[test]
    fn test_load_all_five() {
        let tmp = tempfile::tempdir().unwrap();
        write_store(tmp.path(), None);

        let repo = ModelRepository::new(test_config());
        let set = repo.load(&DirStore::new(tmp.path())).unwrap();
        assert_eq!(set.len(), 5);
        for &label in &DiseaseLabel::ALL {
            assert!(set.get(label).is_some());
        }
        assert_eq!(repo.status().state, "loaded");
    }

    #[test]
    fn test_load_is_idempotent_and_cached() {
        let tmp = tempfile::tempdir().unwrap();
        write_store(tmp.path(), None);

        let repo = ModelRepository::new(test_config());
        let store = DirStore::new(tmp.path());
        let first = repo.load(&store).unwrap();

        // Wipe the store: a second load must still succeed from memory
        for entry in fs::read_dir(tmp.path()).unwrap() {
            fs::remove_file(entry.unwrap().path()).unwrap();
        }
        let second = repo.load(&store).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_partial_store_is_all_or_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        write_store(tmp.path(), Some(DiseaseLabel::Meniere));

        let repo = ModelRepository::new(test_config());
        let err = repo.load(&DirStore::new(tmp.path())).unwrap_err();
        assert!(matches!(err, LoadError::Fetch { .. }));
        assert_eq!(repo.status().state, "failed");
    }

    #[test]
    fn test_failed_state_is_retryable() {
        let tmp = tempfile::tempdir().unwrap();
        write_store(tmp.path(), Some(DiseaseLabel::Others));

        let repo = ModelRepository::new(test_config());
        let store = DirStore::new(tmp.path());
        assert!(repo.load(&store).is_err());
        assert_eq!(repo.status().state, "failed");

        // Operator ships the missing artifact; the next call recovers
        write_store(tmp.path(), None);
        assert!(repo.load(&store).is_ok());
        assert_eq!(repo.status().state, "loaded");
    }

    #[test]
    fn test_digest_mismatch_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        write_store(tmp.path(), None);

        let mut config = test_config();
        config.artifacts[0].1.sha256 = Some("0".repeat(64));
        let repo = ModelRepository::new(config);
        let err = repo.load(&DirStore::new(tmp.path())).unwrap_err();
        assert!(matches!(err, LoadError::DigestMismatch { .. }));
    }

    #[test]
    fn test_wrong_disease_in_artifact_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        write_store(tmp.path(), None);
        // BPPV slot holds a VN artifact
        let bytes = serde_json::to_vec(&test_artifact(DiseaseLabel::Vn)).unwrap();
        fs::write(tmp.path().join("label_bppv_model.json"), bytes).unwrap();

        let repo = ModelRepository::new(test_config());
        let err = repo.load(&DirStore::new(tmp.path())).unwrap_err();
        assert!(matches!(err, LoadError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_status_starts_not_loaded() {
        let repo = ModelRepository::new(test_config());
        let status = repo.status();
        assert_eq!(status.state, "not_loaded");
        assert_eq!(status.model_count, 0);
    }
}
