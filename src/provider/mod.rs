// src/provider/mod.rs — Text-generation provider layer

pub mod google;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::infra::config::GenerationConfig;
use crate::infra::errors::BioAstraError;

/// Synchronous-from-the-caller's-view text generation: one prompt in, one
/// text out. Implementations enforce their own timeout.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn id(&self) -> &str;
    fn model(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String, BioAstraError>;

    async fn list_models(&self) -> Result<Vec<String>, BioAstraError> {
        Ok(vec![self.model().to_string()])
    }
}

/// Build the configured provider, or `None` when no credential is available.
pub fn from_config(config: &GenerationConfig) -> Option<Arc<dyn TextGenerator>> {
    let Some(api_key) = config.resolve_api_key() else {
        tracing::warn!(
            "No API key found in ${} or [generation].api_key; chat is disabled",
            config.api_key_env
        );
        return None;
    };

    let provider = google::GoogleProvider::new(api_key, config.model.clone())
        .with_base_url(config.base_url.clone())
        .with_timeout(Duration::from_secs(config.timeout_seconds));
    Some(Arc::new(provider))
}

/// Probe the provider once. Used at startup to fail fast on a bad key or model.
pub async fn health_check(generator: &dyn TextGenerator) -> Result<(), BioAstraError> {
    let started = std::time::Instant::now();
    generator.generate("Hello").await?;
    tracing::info!(
        provider = generator.id(),
        model = generator.model(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Generation provider healthy"
    );
    Ok(())
}
