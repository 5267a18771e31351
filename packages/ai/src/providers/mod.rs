//! LLM provider abstraction and implementations.

pub mod openrouter;

use crate::{AiConfig, AiError};

/// Trait for LLM providers.
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Sends a single user prompt and returns the model's answer.
    ///
    /// # Errors
    ///
    /// Returns [`AiError::EmptyResponse`] if the model returned no text,
    /// or another [`AiError`] if the request fails.
    async fn complete(&self, prompt: &str) -> Result<String, AiError>;
}

/// Creates the provider described by `config`, reading the API key from
/// the configured environment variable.
///
/// # Errors
///
/// Returns [`AiError::Config`] if the key variable is unset or empty.
pub fn create_provider(config: &AiConfig) -> Result<Box<dyn LlmProvider>, AiError> {
    let api_key = std::env::var(&config.api_key_env)
        .ok()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| AiError::Config {
            message: format!("{} environment variable not set", config.api_key_env),
        })?;

    log::debug!("Using model {} at {}", config.model, config.endpoint);
    Ok(Box::new(openrouter::OpenRouterProvider::new(
        api_key,
        config.clone(),
    )))
}
