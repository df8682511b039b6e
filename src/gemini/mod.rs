//! Gemini service boundary — the only place that talks to the hosted model.
//!
//! Two structured requests per analysis flow through here, each constrained
//! by a declared response schema (see [`schema`]). The `GenerativeClient`
//! trait keeps the pipeline testable without network access.

pub mod client;
pub mod schema;

pub use client::*;
pub use schema::*;

use serde::Serialize;
use thiserror::Error;

/// One part of a Gemini request: either instruction text or an inline
/// base64-encoded document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase", untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    /// Base64-encoded file bytes.
    pub data: String,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn inline_data(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self::InlineData {
            inline_data: InlineData {
                mime_type: mime_type.into(),
                data: data.into(),
            },
        }
    }
}

/// Errors from the Gemini boundary.
#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("No Gemini API key configured (set GEMINI_API_KEY)")]
    ApiKeyMissing,

    #[error("Cannot reach Gemini at {0}")]
    Connection(String),

    #[error("Gemini request timed out after {0}s")]
    Timeout(u64),

    /// 429 / 503 from the service — the one category the user should retry.
    #[error("Gemini is overloaded (status {status})")]
    Overloaded { status: u16 },

    #[error("Gemini returned error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Gemini response had no candidates")]
    EmptyCandidates,

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

/// Abstraction over the generative model, mirroring the shape of the two
/// calls the pipeline makes: parts in, schema-constrained JSON text out.
///
/// Implementations are blocking; callers run them on a blocking task.
pub trait GenerativeClient: Send + Sync {
    /// Issue one `generateContent` request constrained to emit JSON matching
    /// `response_schema`, returning the raw JSON text of the first candidate.
    fn generate_json(
        &self,
        model: &str,
        parts: &[Part],
        response_schema: serde_json::Value,
    ) -> Result<String, GeminiError>;
}
