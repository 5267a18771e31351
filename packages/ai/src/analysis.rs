//! Report and question prompts over the unified table.

use safecity_analytics::data_summary;
use safecity_crime_models::UnifiedRecord;

use crate::providers::LlmProvider;
use crate::{AiError, ERROR_FALLBACK_PREFIX, NO_RESPONSE_FALLBACK};

/// Instruction that opens the report prompt.
pub const REPORT_INSTRUCTION: &str =
    "Fais un rapport synthétique sur les données de criminalité suivantes :\n\n";

/// Builds the prompt asking for a summary report of `summary`.
#[must_use]
pub fn report_prompt(summary: &str) -> String {
    format!("{REPORT_INSTRUCTION}{summary}")
}

/// Builds the prompt answering `question` about `summary`.
#[must_use]
pub fn question_prompt(summary: &str, question: &str) -> String {
    format!(
        "Voici les données de criminalité par département :\n\n{summary}\n\nQuestion : {}",
        question.trim()
    )
}

/// Maps a provider outcome to the text shown to the user.
#[must_use]
pub fn answer_or_fallback(result: Result<String, AiError>) -> String {
    match result {
        Ok(text) => text,
        Err(AiError::EmptyResponse) => {
            log::warn!("Model returned no text");
            NO_RESPONSE_FALLBACK.to_string()
        }
        Err(e) => {
            log::error!("Model request failed: {e}");
            format!("{ERROR_FALLBACK_PREFIX}{e}")
        }
    }
}

/// Asks the model for a report on `records`, or to answer `question`
/// about them.
///
/// Never fails: errors are turned into a fallback message.
pub async fn analyze<'a>(
    provider: &dyn LlmProvider,
    records: impl IntoIterator<Item = &'a UnifiedRecord>,
    question: Option<&str>,
) -> String {
    let summary = data_summary(records);
    let prompt = match question.filter(|q| !q.trim().is_empty()) {
        Some(question) => question_prompt(&summary, question),
        None => report_prompt(&summary),
    };

    answer_or_fallback(provider.complete(&prompt).await)
}
