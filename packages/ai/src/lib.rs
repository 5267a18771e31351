#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Language-model analysis of the unified crime table.
//!
//! A provider sends one prompt to an `OpenAI`-compatible chat completion
//! endpoint (`OpenRouter` by default) and returns the text of the first
//! choice. [`analysis::analyze`] builds the prompt from a data summary and
//! never fails: empty responses and transport errors become user-facing
//! fallback messages.

pub mod analysis;
pub mod providers;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Returned when the model answers without any usable text.
pub const NO_RESPONSE_FALLBACK: &str =
    "L'IA n'a pas renvoyé de réponse. Essayez de poser une question plus détaillée.";

/// Prefix of the message returned when the request itself fails.
pub const ERROR_FALLBACK_PREFIX: &str = "L'IA n'a pas pu générer de réponse: ";

/// Errors that can occur during AI operations.
#[derive(Debug, Error)]
pub enum AiError {
    /// HTTP request to LLM provider failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Provider-specific error.
    #[error("Provider error: {message}")]
    Provider {
        /// Description of what went wrong.
        message: String,
    },

    /// The response carried no choice with text.
    #[error("The model returned no text")]
    EmptyResponse,

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// Description.
        message: String,
    },
}

/// Chat completion endpoint settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct AiConfig {
    /// Chat completion URL.
    pub endpoint: String,
    /// Model identifier.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Maximum tokens in the answer.
    pub max_tokens: u32,
    /// Environment variable holding the bearer token.
    pub api_key_env: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://openrouter.ai/api/v1/chat/completions".to_string(),
            model: "mistralai/mistral-7b-instruct".to_string(),
            temperature: 0.3,
            max_tokens: 500,
            api_key_env: "OPENROUTER_API_KEY".to_string(),
        }
    }
}
