//! Gemini backend for the `LanguageModel` trait, over the Generative Language REST API

use crate::config::ModelSettings;
use crate::error::ModelError;
use crate::summarizer::{LanguageModel, ModelResponse};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Categories filtered at [`SAFETY_THRESHOLD`]
const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

const SAFETY_THRESHOLD: &str = "BLOCK_MEDIUM_AND_ABOVE";

/// Immutable Gemini client, built once at startup and shared by every call
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: &str, api_base_url: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: format!(
                "{}/v1beta/models/{}:generateContent",
                api_base_url.trim_end_matches('/'),
                model
            ),
            api_key: api_key.into(),
        }
    }

    /// Build from settings; `None` when no API key is configured
    pub fn from_settings(settings: &ModelSettings) -> Option<Self> {
        let api_key = settings.api_key.as_deref()?;
        Some(Self::new(api_key, &settings.model, &settings.api_base_url))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    safety_settings: Vec<SafetySetting<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct SafetySetting<'a> {
    category: &'a str,
    threshold: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

fn request_body(prompt: &str) -> GenerateRequest<'_> {
    GenerateRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![RequestPart { text: prompt }],
        }],
        safety_settings: SAFETY_CATEGORIES
            .into_iter()
            .map(|category| SafetySetting {
                category,
                threshold: SAFETY_THRESHOLD,
            })
            .collect(),
    }
}

impl From<GenerateResponse> for ModelResponse {
    fn from(response: GenerateResponse) -> Self {
        let block_reason = response.prompt_feedback.and_then(|f| f.block_reason);
        let first = response.candidates.into_iter().next();

        let (text, finish_reason) = match first {
            Some(candidate) => {
                let text = candidate
                    .content
                    .map(|content| {
                        content
                            .parts
                            .into_iter()
                            .filter_map(|part| part.text)
                            .collect::<String>()
                    })
                    .filter(|text| !text.is_empty());
                (text, candidate.finish_reason)
            }
            None => (None, None),
        };

        ModelResponse {
            text,
            finish_reason,
            block_reason,
        }
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<ModelResponse, ModelError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body(prompt))
            .send()
            .await
            .map_err(|e| ModelError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ModelError::Request(format!("reading response body: {}", e)))?;

        if !status.is_success() {
            // Error bodies may still carry prompt feedback
            let block_reason = serde_json::from_str::<GenerateResponse>(&body)
                .ok()
                .and_then(|r| r.prompt_feedback)
                .and_then(|f| f.block_reason);
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(ModelError::Api {
                status: status.as_u16(),
                message,
                block_reason,
            });
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&body).map_err(|e| ModelError::InvalidResponse(e.to_string()))?;

        Ok(parsed.into())
    }
}
