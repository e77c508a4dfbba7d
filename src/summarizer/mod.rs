//! Summarization of crawled documentation text through a language model

pub mod gemini;

use crate::error::{ModelError, SummarizeError};
use crate::parsers::text::{is_blank, truncate_chars};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

pub use gemini::GeminiClient;

/// Longest input, in characters, sent to the model
pub const MAX_INPUT_CHARS: usize = 150_000;

/// Appended to input cut at [`MAX_INPUT_CHARS`]
pub const TRUNCATION_MARKER: &str = "\n\n[Content truncated due to length]";

/// Returned when there is nothing to summarize
pub const NO_CONTENT_MESSAGE: &str = "No content found to summarize.";

const NO_VALID_RESPONSE_MESSAGE: &str =
    "Summary generation failed: no valid response from the model.";

/// Finish reason of a complete generation
const FINISH_STOP: &str = "STOP";

const PROMPT_HEADER: &str = "\
You are a technical documentation analyst. The text below was extracted from a \
documentation page and the pages it links to. Write a concise summary aimed at a \
developer who is about to use this library or service. Focus on:

1. Core API usage: the main entry points, functions or endpoints and how to call them.
2. Implementation patterns: recommended ways to structure code that uses it.
3. Configuration: required setup, options, environment variables and defaults.
4. Gotchas: common pitfalls, version caveats, limitations and breaking changes.

Skip navigation text, marketing copy and anything unrelated to using the software.

Documentation text:
";

/// Raw outcome of one model call, before interpretation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelResponse {
    /// Concatenated text of the first candidate
    pub text: Option<String>,
    /// Finish reason of the first candidate
    pub finish_reason: Option<String>,
    /// Prompt-level block reason
    pub block_reason: Option<String>,
}

/// A configured language-model backend
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<ModelResponse, ModelError>;
}

/// Outcome of a summarization that did not hard-fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Summary {
    Text(String),
    NoContent,
    Blocked { reason: String },
    Incomplete { finish_reason: String },
    NoValidResponse,
}

impl Summary {
    /// True only for an actual model-written summary
    pub fn is_text(&self) -> bool {
        matches!(self, Summary::Text(_))
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Summary::Text(text) => f.write_str(text),
            Summary::NoContent => f.write_str(NO_CONTENT_MESSAGE),
            Summary::Blocked { reason } => {
                write!(f, "Summary generation blocked due to: {}", reason)
            }
            Summary::Incomplete { finish_reason } => {
                write!(f, "Summary generation failed: finish reason {}", finish_reason)
            }
            Summary::NoValidResponse => f.write_str(NO_VALID_RESPONSE_MESSAGE),
        }
    }
}

impl From<Summary> for String {
    fn from(summary: Summary) -> Self {
        match summary {
            Summary::Text(text) => text,
            other => other.to_string(),
        }
    }
}

/// Caps the input at [`MAX_INPUT_CHARS`], marking any cut
pub fn prepare_input(text: &str) -> std::borrow::Cow<'_, str> {
    truncate_chars(text, MAX_INPUT_CHARS, TRUNCATION_MARKER)
}

/// Wraps documentation text in the instruction template
pub fn build_prompt(text: &str) -> String {
    let mut prompt = String::with_capacity(PROMPT_HEADER.len() + text.len());
    prompt.push_str(PROMPT_HEADER);
    prompt.push_str(text);
    prompt
}

/// Turns crawled text into a summary using an injected model client
#[derive(Clone)]
pub struct Summarizer {
    model: Arc<dyn LanguageModel>,
}

impl Summarizer {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    pub async fn summarize(&self, text: &str) -> Result<Summary, SummarizeError> {
        if is_blank(text) {
            ::log::info!("Nothing to summarize, skipping model call");
            return Ok(Summary::NoContent);
        }

        let input = prepare_input(text);
        if input.len() != text.len() {
            ::log::info!(
                "Truncated summarizer input to {} characters",
                MAX_INPUT_CHARS
            );
        }

        let prompt = build_prompt(&input);
        ::log::debug!("Sending {} prompt bytes to the model", prompt.len());

        match self.model.generate(&prompt).await {
            Ok(response) => Ok(interpret(response)),
            Err(e) => {
                if let Some(reason) = e.block_reason() {
                    ::log::warn!("Model refused the request: {}", reason);
                    return Ok(Summary::Blocked {
                        reason: reason.to_string(),
                    });
                }
                ::log::error!("Model call failed: {}", e);
                Err(SummarizeError::Model {
                    detail: e.to_string(),
                })
            }
        }
    }
}

fn interpret(response: ModelResponse) -> Summary {
    if let Some(reason) = response.block_reason {
        ::log::warn!("Prompt blocked by the model: {}", reason);
        return Summary::Blocked { reason };
    }

    match (response.finish_reason, response.text) {
        (Some(reason), _) if reason != FINISH_STOP => {
            ::log::warn!("Model stopped early: {}", reason);
            Summary::Incomplete {
                finish_reason: reason,
            }
        }
        (_, Some(text)) if !is_blank(&text) => Summary::Text(text),
        _ => Summary::NoValidResponse,
    }
}
