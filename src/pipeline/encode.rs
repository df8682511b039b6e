//! File encoder — turns the uploaded bytes into the inline representation
//! the Gemini request embeds.

use base64::Engine as _;

use super::AnalysisError;

/// MIME types the upload form accepts.
pub const ALLOWED_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "application/pdf"];

/// Upload cap. The original UI only promised "hasta 10MB" in copy; the HTTP
/// body limit enforces it here.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Inline error for an unsupported or missing file type.
pub const INVALID_FILE_TYPE: &str =
    "Por favor, sube un tipo de archivo válido (JPEG, PNG, PDF).";

/// A document ready to embed in a JSON request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedDocument {
    pub mime_type: String,
    /// Base64 encoding of the file bytes.
    pub data: String,
}

/// Encode an uploaded file for transport.
///
/// The multipart part's declared content type wins; when the browser sent
/// none, the filename extension decides. Anything outside
/// [`ALLOWED_MIME_TYPES`] is rejected before any request is built.
pub fn encode_document(
    file_name: &str,
    content_type: Option<&str>,
    bytes: &[u8],
) -> Result<EncodedDocument, AnalysisError> {
    let mime_type = content_type
        .map(str::to_string)
        .filter(|ct| !ct.is_empty())
        .or_else(|| {
            mime_guess::from_path(file_name)
                .first()
                .map(|m| m.essence_str().to_string())
        })
        .unwrap_or_default();

    if !ALLOWED_MIME_TYPES.contains(&mime_type.as_str()) {
        return Err(AnalysisError::InvalidInput(INVALID_FILE_TYPE.to_string()));
    }

    Ok(EncodedDocument {
        mime_type,
        data: base64::engine::general_purpose::STANDARD.encode(bytes),
    })
}
