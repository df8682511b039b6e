//! The analysis pipeline: encode → extract → interpret → assemble.
//!
//! Both model calls are strictly sequential — interpretation consumes
//! extraction's output. Any failure short-circuits; there is no retry and
//! no partial report.

pub mod encode;
pub mod parser;
pub mod prompt;

pub use encode::*;
pub use parser::*;
pub use prompt::*;

use thiserror::Error;

use crate::gemini::{
    extraction_response_schema, interpretation_response_schema, GeminiError, GenerativeClient,
    Part,
};
use crate::models::{LabReport, ValidatedPatient};

/// User-facing message when the service is overloaded.
pub const SERVICE_BUSY_MESSAGE: &str =
    "El servicio está actualmente ocupado. Por favor, inténtalo de nuevo en un momento.";

/// User-facing message when extraction finds nothing.
pub const EMPTY_EXTRACTION_MESSAGE: &str =
    "No se pudieron extraer analitos. El informe podría estar borroso o en un formato no compatible.";

/// Catch-all user-facing message for any other failure.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "No se pudo analizar el informe de laboratorio. Asegúrate de que el archivo subido sea \
     una imagen clara o un PDF de un informe de laboratorio.";

/// Everything that can go wrong between submission and a finished report.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Pre-request validation failure. The message is already user-facing.
    #[error("{0}")]
    InvalidInput(String),

    /// The model returned zero usable analytes.
    #[error("Extraction produced no analytes")]
    EmptyExtraction,

    /// The model's JSON did not match the declared schema.
    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    #[error(transparent)]
    Gemini(#[from] GeminiError),
}

impl AnalysisError {
    /// Translate into the small set of user-facing Spanish messages.
    ///
    /// Rate-limiting/overload and empty extraction get distinct messages so
    /// the user knows whether to retry or re-scan; everything else collapses
    /// into the generic one.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidInput(msg) => msg.clone(),
            Self::EmptyExtraction => EMPTY_EXTRACTION_MESSAGE.to_string(),
            Self::Gemini(GeminiError::Overloaded { .. }) => SERVICE_BUSY_MESSAGE.to_string(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

/// Which models each stage uses. Split out so tests can pin stage routing.
#[derive(Debug, Clone)]
pub struct StageModels {
    pub extraction: String,
    pub interpretation: String,
}

impl StageModels {
    pub fn from_config(config: &crate::config::AppConfig) -> Self {
        Self {
            extraction: config.extraction_model.clone(),
            interpretation: config.interpretation_model.clone(),
        }
    }
}

/// Run the full analysis: one extraction call, then one interpretation call,
/// then assemble the [`LabReport`] atomically.
pub fn run_analysis(
    client: &dyn GenerativeClient,
    document: &EncodedDocument,
    patient: &ValidatedPatient,
    models: &StageModels,
) -> Result<LabReport, AnalysisError> {
    let started = std::time::Instant::now();

    // Stage 1: document → structured analytes.
    let extraction_parts = [
        Part::text(prompt::build_extraction_prompt(patient)),
        Part::inline_data(document.mime_type.clone(), document.data.clone()),
    ];
    let extraction_text = client.generate_json(
        &models.extraction,
        &extraction_parts,
        extraction_response_schema(),
    )?;
    let analytes = parser::parse_extraction_response(&extraction_text)?;

    tracing::info!(
        model = %models.extraction,
        analyte_count = analytes.len(),
        elapsed_ms = %started.elapsed().as_millis(),
        "Extraction stage complete"
    );

    // Stage 2: analytes → narrative summaries.
    let interpretation_prompt = prompt::build_interpretation_prompt(&analytes, patient)
        .map_err(|e| AnalysisError::MalformedResponse(format!("analyte serialization: {e}")))?;
    let interpretation_text = client.generate_json(
        &models.interpretation,
        &[Part::text(interpretation_prompt)],
        interpretation_response_schema(),
    )?;
    let summaries = parser::parse_interpretation_response(&interpretation_text)?;

    tracing::info!(
        model = %models.interpretation,
        elapsed_ms = %started.elapsed().as_millis(),
        "Interpretation stage complete"
    );

    Ok(LabReport {
        analytes,
        patient_summary: summaries.patient_summary,
        doctor_summary: summaries.doctor_summary,
        specialist_recommendation: summaries.specialist_recommendation,
    })
}
