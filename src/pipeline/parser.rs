//! Parsing of the model's schema-constrained JSON responses.
//!
//! With `responseMimeType: application/json` the text should be bare JSON,
//! but models occasionally wrap it in ```json fences anyway; those are
//! stripped. Analyte items are parsed leniently — a malformed item is
//! skipped, not fatal — and items without a usable name or value are
//! dropped, so "missing value" never becomes a stored null.

use serde::Deserialize;

use super::AnalysisError;
use crate::models::Analyte;

/// Parse the extraction response into the ordered analyte list.
///
/// Zero analytes after filtering is a hard failure: a silent empty report
/// would look like a clean bill of health.
pub fn parse_extraction_response(text: &str) -> Result<Vec<Analyte>, AnalysisError> {
    #[derive(Deserialize)]
    struct ExtractionResponse {
        #[serde(default)]
        analytes: Vec<serde_json::Value>,
    }

    let json = strip_code_fences(text);
    let raw: ExtractionResponse = serde_json::from_str(json)
        .map_err(|e| AnalysisError::MalformedResponse(format!("extraction JSON: {e}")))?;

    let analytes: Vec<Analyte> = raw
        .analytes
        .into_iter()
        .filter_map(|item| serde_json::from_value::<Analyte>(item).ok())
        .filter(|a| !a.name.trim().is_empty() && !a.value.trim().is_empty())
        .collect();

    if analytes.is_empty() {
        return Err(AnalysisError::EmptyExtraction);
    }

    Ok(analytes)
}

/// The three narrative fields of the interpretation response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summaries {
    pub patient_summary: String,
    pub doctor_summary: String,
    pub specialist_recommendation: String,
}

/// Parse the interpretation response. All three keys must be present.
pub fn parse_interpretation_response(text: &str) -> Result<Summaries, AnalysisError> {
    let json = strip_code_fences(text);
    serde_json::from_str(json)
        .map_err(|e| AnalysisError::MalformedResponse(format!("interpretation JSON: {e}")))
}

/// Strip a surrounding ```json ... ``` fence, if present.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}
