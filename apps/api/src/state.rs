use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::rate_limit::RateLimiter;
use crate::scoring::cache::ModelCache;
use crate::scoring::review::{LlmReviewer, SectionReviewer};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
    /// Grammar and suggestion reviewer. Default: `LlmReviewer` over `llm`.
    pub reviewer: Arc<dyn SectionReviewer>,
    pub models: Arc<ModelCache>,
    pub rate_limiter: Arc<RateLimiter>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config, llm: LlmClient) -> Self {
        Self {
            reviewer: Arc::new(LlmReviewer::new(llm.clone())),
            models: Arc::new(ModelCache::new(
                config.model_paths.clone(),
                config.model_cache_ttl,
            )),
            rate_limiter: Arc::new(RateLimiter::new(config.rate_limit, config.rate_window)),
            llm,
            config,
        }
    }
}
