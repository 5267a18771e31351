//! `OpenRouter` (`OpenAI`-compatible chat completion) provider.

use serde::{Deserialize, Serialize};

use super::LlmProvider;
use crate::{AiConfig, AiError};

/// Chat completion provider for `OpenRouter` and compatible servers.
pub struct OpenRouterProvider {
    api_key: String,
    config: AiConfig,
    client: reqwest::Client,
}

impl OpenRouterProvider {
    /// Creates a new provider.
    #[must_use]
    pub fn new(api_key: String, config: AiConfig) -> Self {
        Self {
            api_key,
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: [RequestMessage<'a>; 1],
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct RequestMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

/// Chat servers answer with `message.content`; legacy completion servers
/// with `text`.
#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
    text: Option<String>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Extracts the trimmed text of the first choice.
fn first_choice_text(response: CompletionResponse) -> Result<String, AiError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or(AiError::EmptyResponse)?;

    choice
        .message
        .and_then(|m| m.content)
        .or(choice.text)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or(AiError::EmptyResponse)
}

#[async_trait::async_trait]
impl LlmProvider for OpenRouterProvider {
    async fn complete(&self, prompt: &str) -> Result<String, AiError> {
        let request = CompletionRequest {
            model: &self.config.model,
            messages: [RequestMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        log::debug!(
            "Sending {} byte prompt to {}",
            prompt.len(),
            self.config.endpoint
        );

        let resp = self
            .client
            .post(&self.config.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let err: ErrorResponse = serde_json::from_str(&body).unwrap_or_else(|_| ErrorResponse {
                error: ErrorDetail {
                    message: format!("HTTP {status}: {body}"),
                },
            });
            return Err(AiError::Provider {
                message: err.error.message,
            });
        }

        let response: CompletionResponse = serde_json::from_str(&body)?;
        first_choice_text(response)
    }
}
