//! Gemini HTTP client for the `generateContent` REST endpoint.
//!
//! Blocking, like the rest of the pipeline — handlers run it via
//! `spawn_blocking`. The reqwest client is built per call so `GeminiClient`
//! itself can be constructed on the async runtime at startup.

use serde::{Deserialize, Serialize};

use super::{GeminiError, GenerativeClient, Part};
use crate::config::AppConfig;

/// Client for the hosted Gemini REST API.
pub struct GeminiClient {
    base_url: String,
    api_key: Option<String>,
    timeout_secs: u64,
}

impl GeminiClient {
    pub fn new(base_url: &str, api_key: Option<String>, timeout_secs: u64) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            timeout_secs,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            &config.gemini_base_url,
            config.api_key.clone(),
            config.request_timeout_secs,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }
}

/// Request body for `models/{model}:generateContent`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: &'a [Part],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: serde_json::Value,
}

/// Response body — only the fields we read.
#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

fn build_request(parts: &[Part], response_schema: serde_json::Value) -> GenerateContentRequest<'_> {
    GenerateContentRequest {
        contents: vec![Content { parts }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
            response_schema,
        },
    }
}

/// Map a non-success HTTP status to the error taxonomy.
/// 429 and 503 are the retryable overload category.
fn status_to_error(status: u16, body: String) -> GeminiError {
    match status {
        429 | 503 => GeminiError::Overloaded { status },
        _ => GeminiError::Api { status, body },
    }
}

/// Pull the first candidate's text out of the response.
fn first_candidate_text(response: GenerateContentResponse) -> Result<String, GeminiError> {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().find_map(|p| p.text))
        .ok_or(GeminiError::EmptyCandidates)
}

impl GenerativeClient for GeminiClient {
    fn generate_json(
        &self,
        model: &str,
        parts: &[Part],
        response_schema: serde_json::Value,
    ) -> Result<String, GeminiError> {
        let api_key = self.api_key.as_deref().ok_or(GeminiError::ApiKeyMissing)?;

        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(self.timeout_secs))
            .build()
            .map_err(|e| GeminiError::HttpClient(e.to_string()))?;

        let body = build_request(parts, response_schema);

        let response = client
            .post(self.endpoint(model))
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    GeminiError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    GeminiError::Timeout(self.timeout_secs)
                } else {
                    GeminiError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(status_to_error(status.as_u16(), body));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .map_err(|e| GeminiError::ResponseParsing(e.to_string()))?;

        first_candidate_text(parsed)
    }
}

// ═══════════════════════════════════════════════════════════
// Mock client for tests
// ═══════════════════════════════════════════════════════════

/// A call recorded by [`MockGenerativeClient`].
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub model: String,
    pub prompt_text: String,
    pub has_inline_data: bool,
    pub response_schema: serde_json::Value,
}

/// Mock model client — returns queued responses and records every call.
#[cfg(test)]
pub struct MockGenerativeClient {
    responses: std::sync::Mutex<std::collections::VecDeque<Result<String, GeminiError>>>,
    calls: std::sync::Mutex<Vec<RecordedCall>>,
}

#[cfg(test)]
impl MockGenerativeClient {
    pub fn new() -> Self {
        Self {
            responses: std::sync::Mutex::new(std::collections::VecDeque::new()),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn with_response(self, response: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(response.to_string()));
        self
    }

    pub fn with_error(self, error: GeminiError) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[cfg(test)]
impl GenerativeClient for MockGenerativeClient {
    fn generate_json(
        &self,
        model: &str,
        parts: &[Part],
        response_schema: serde_json::Value,
    ) -> Result<String, GeminiError> {
        let prompt_text = parts
            .iter()
            .filter_map(|p| match p {
                Part::Text { text } => Some(text.as_str()),
                Part::InlineData { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n");
        let has_inline_data = parts
            .iter()
            .any(|p| matches!(p, Part::InlineData { .. }));

        self.calls.lock().unwrap().push(RecordedCall {
            model: model.to_string(),
            prompt_text,
            has_inline_data,
            response_schema,
        });

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("{}".to_string()))
    }
}
