/// LLM Client: the single point of entry for all generative-model calls.
///
/// ARCHITECTURAL RULE: No other module may talk to the model provider directly.
/// Segmentation, grammar review, suggestions and document structuring all go
/// through `LlmClient::call` / `LlmClient::call_json`.
///
/// Fallback policy: the configured model identifiers are tried in priority
/// order, each up to `max_retries` times with a fixed pause between attempts.
/// The first non-empty response wins.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

pub mod gemini;
pub mod prompts;

/// Attempts per model identifier when the caller has no preference.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Pause between two attempts against the same model identifier.
const RETRY_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("All language models failed after {retries} retries. Last error: {last}")]
    Exhausted { retries: u32, last: String },
}

/// One round-trip to a hosted model. Implementations make exactly one attempt;
/// retrying and falling back across models is `LlmClient`'s job.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, model: &str, prompt: &str) -> Result<String, LlmError>;
}

/// The language-model gateway shared by every adapter.
#[derive(Clone)]
pub struct LlmClient {
    backend: Arc<dyn CompletionBackend>,
    models: Arc<[String]>,
    retry_delay: Duration,
}

impl LlmClient {
    pub fn new(backend: Arc<dyn CompletionBackend>, models: Vec<String>) -> Self {
        Self {
            backend,
            models: models.into(),
            retry_delay: RETRY_DELAY,
        }
    }

    /// Overrides the pause between attempts on the same model.
    #[cfg(test)]
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// Sends `prompt` to each configured model in priority order and returns
    /// the first successful response with Markdown code fences removed.
    pub async fn call(&self, prompt: &str, max_retries: u32) -> Result<String, LlmError> {
        let mut last_error: Option<LlmError> = None;

        for model in self.models.iter() {
            for attempt in 0..max_retries {
                let outcome = match self.backend.complete(model, prompt).await {
                    Ok(text) if text.trim().is_empty() => Err(LlmError::EmptyContent),
                    other => other,
                };

                match outcome {
                    Ok(text) => {
                        debug!("LLM call succeeded with model {model} on attempt {}", attempt + 1);
                        return Ok(strip_json_fences(&text).to_string());
                    }
                    Err(e) => {
                        warn!("Attempt {} failed with model {model}: {e}", attempt + 1);
                        last_error = Some(e);
                        if attempt + 1 < max_retries {
                            tokio::time::sleep(self.retry_delay).await;
                        }
                    }
                }
            }
        }

        Err(LlmError::Exhausted {
            retries: max_retries,
            last: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no language model was attempted".to_string()),
        })
    }

    /// Convenience method that calls the gateway and deserializes the response as JSON.
    /// The prompt must instruct the model to return valid JSON.
    pub async fn call_json<T: DeserializeOwned>(&self, prompt: &str) -> Result<T, LlmError> {
        let text = self.call(prompt, DEFAULT_MAX_RETRIES).await?;
        serde_json::from_str(&text).map_err(LlmError::Parse)
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match inner {
        Some(stripped) => {
            let stripped = stripped.trim_start();
            stripped
                .strip_suffix("```")
                .map(|s| s.trim())
                .unwrap_or(stripped)
        }
        None => text
            .strip_suffix("```json")
            .or_else(|| text.strip_suffix("```"))
            .map(|s| s.trim())
            .unwrap_or(text),
    }
}
