//! A single measured lab value as the extraction stage returns it.

use serde::{Deserialize, Serialize};

/// Where a value falls relative to its reference range.
///
/// The internal enumeration is the clean four-way one; the wire labels are
/// Spanish because the whole application output is Spanish. Deserialization
/// additionally accepts `LÃ­mite` — the mojibake form of `Límite` that the
/// original type declaration shipped with (an encoding bug, not a fifth
/// state) — and the English labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalyteStatus {
    Normal,
    #[serde(rename = "Alto", alias = "High")]
    High,
    #[serde(rename = "Bajo", alias = "Low")]
    Low,
    #[serde(rename = "Límite", alias = "LÃ­mite", alias = "Limite", alias = "Borderline")]
    Borderline,
}

impl AnalyteStatus {
    /// Spanish wire label, as shown in the results table.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::High => "Alto",
            Self::Low => "Bajo",
            Self::Borderline => "Límite",
        }
    }

    pub fn is_abnormal(&self) -> bool {
        !matches!(self, Self::Normal)
    }
}

/// One extracted analyte. The value stays a string: lab reports mix numeric
/// results with qualitative ones ("Negativo", "<0.1").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analyte {
    pub name: String,
    pub value: String,
    pub unit: String,
    pub range: String,
    pub status: AnalyteStatus,
    pub explanation: String,
}
