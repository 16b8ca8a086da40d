//! Time-bounded in-memory cache for the model artifacts.
//!
//! Expiry is purely wall-clock: artifacts are reloaded from disk on the first
//! use after `ttl` has elapsed, regardless of whether the files changed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{error, info};

use super::model::{ModelArtifacts, ModelError, ModelPaths};
use crate::errors::AppError;

/// Default artifact lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

struct CachedModels {
    artifacts: Arc<ModelArtifacts>,
    loaded_at: Instant,
}

pub struct ModelCache {
    paths: ModelPaths,
    ttl: Duration,
    slot: Mutex<Option<CachedModels>>,
    loads: AtomicU64,
}

impl ModelCache {
    pub fn new(paths: ModelPaths, ttl: Duration) -> Self {
        Self {
            paths,
            ttl,
            slot: Mutex::new(None),
            loads: AtomicU64::new(0),
        }
    }

    /// Number of times the artifacts were read from disk.
    #[cfg(test)]
    pub fn load_count(&self) -> u64 {
        self.loads.load(Ordering::Relaxed)
    }

    /// Returns the cached artifacts, loading them first when the cache is
    /// empty or expired. The lock is held across the whole check-load-store
    /// sequence, so concurrent callers never load twice. A failed load leaves
    /// the previous entry untouched.
    pub fn get_or_load(&self) -> Result<Arc<ModelArtifacts>, ModelError> {
        let mut slot = self.slot.lock();

        if let Some(cached) = slot.as_ref() {
            if cached.loaded_at.elapsed() < self.ttl {
                return Ok(Arc::clone(&cached.artifacts));
            }
        }

        let started = Instant::now();
        let artifacts = Arc::new(ModelArtifacts::load(&self.paths).inspect_err(|e| {
            error!("Error loading models: {e}");
        })?);
        self.loads.fetch_add(1, Ordering::Relaxed);
        info!(
            "Successfully loaded all models in {:.2} seconds",
            started.elapsed().as_secs_f64()
        );

        *slot = Some(CachedModels {
            artifacts: Arc::clone(&artifacts),
            loaded_at: Instant::now(),
        });
        Ok(artifacts)
    }

    /// `get_or_load` on the blocking pool, with errors mapped for handlers.
    pub async fn get_or_load_async(self: &Arc<Self>) -> Result<Arc<ModelArtifacts>, AppError> {
        let cache = Arc::clone(self);
        tokio::task::spawn_blocking(move || cache.get_or_load())
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Model loading task failed: {e}")))?
            .map_err(AppError::Model)
    }
}
