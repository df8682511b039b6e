//! The combined analysis result.

use serde::{Deserialize, Serialize};

use super::analyte::Analyte;

/// Everything one successful analysis run produces.
///
/// Constructed atomically only after both the extraction and the
/// interpretation stage succeed — there is no partial report state.
/// Analyte order is extraction order and is preserved end to end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabReport {
    pub analytes: Vec<Analyte>,
    pub patient_summary: String,
    pub doctor_summary: String,
    pub specialist_recommendation: String,
}

impl LabReport {
    /// Count of analytes flagged outside their reference range.
    pub fn abnormal_count(&self) -> usize {
        self.analytes
            .iter()
            .filter(|a| a.status.is_abnormal())
            .count()
    }
}
