//! Patient context supplied alongside the uploaded report.
//!
//! Age and sex are both required before an analysis may start — the model
//! uses them to adjust reference-range interpretation. The form fields are
//! nullable, so the raw struct keeps `Option` fields and validation produces
//! the non-optional `ValidatedPatient` the pipeline works with.

use serde::{Deserialize, Serialize};

/// Validation message shown next to the form when age or sex is missing.
pub const MISSING_PATIENT_DATA: &str =
    "Por favor, proporciona la edad y el sexo del paciente para una interpretación precisa.";

/// Biological sex options offered by the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
    Other,
}

impl Sex {
    /// Parse the form's wire value.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "Male" => Some(Self::Male),
            "Female" => Some(Self::Female),
            "Other" => Some(Self::Other),
            _ => None,
        }
    }

    /// Spanish label used inside prompts.
    pub fn spanish_label(&self) -> &'static str {
        match self {
            Self::Male => "Masculino",
            Self::Female => "Femenino",
            Self::Other => "Otro",
        }
    }
}

/// Raw patient form data. Fields are optional until validated.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PatientContext {
    pub age: Option<u32>,
    pub sex: Option<Sex>,
}

/// Patient context after validation — what the pipeline actually consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValidatedPatient {
    pub age: u32,
    pub sex: Sex,
}

impl PatientContext {
    /// Require both fields present and the age positive.
    pub fn validate(&self) -> Result<ValidatedPatient, String> {
        match (self.age, self.sex) {
            (Some(age), Some(sex)) if age > 0 => Ok(ValidatedPatient { age, sex }),
            _ => Err(MISSING_PATIENT_DATA.to_string()),
        }
    }
}
