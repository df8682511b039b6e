//! Declared response schemas — the wire contract with the model.
//!
//! These schemas are sent as `generationConfig.responseSchema` and are the
//! single source of truth for what the parser on the other side of the call
//! expects. Field names and the status enumeration must stay in sync with
//! `models::Analyte` / `pipeline::parser`; the tests below pin that.
//!
//! Gemini's REST schema dialect is OpenAPI-flavored with uppercase type
//! names (`OBJECT`, `ARRAY`, `STRING`).

use serde_json::{json, Value};

/// Wire labels of the status enumeration, as constrained server-side.
pub const STATUS_ENUM: [&str; 4] = ["Normal", "Alto", "Bajo", "Límite"];

/// Schema for the extraction response:
/// `{ analytes: [{name, value, unit, range, status, explanation}] }`.
pub fn extraction_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "analytes": {
                "type": "ARRAY",
                "items": analyte_schema()
            }
        }
    })
}

fn analyte_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "name": {
                "type": "STRING",
                "description": "Nombre del analito (ej., \"Glucosa\", \"Hemoglobina A1c\")"
            },
            "value": {
                "type": "STRING",
                "description": "El valor medido del analito."
            },
            "unit": {
                "type": "STRING",
                "description": "La unidad de medida (ej., \"mg/dL\", \"g/dL\")."
            },
            "range": {
                "type": "STRING",
                "description": "El rango de referencia normal (ej., \"70-99\")."
            },
            "status": {
                "type": "STRING",
                "description": "Estado del resultado (ej., \"Normal\", \"Alto\", \"Bajo\", \"Límite\").",
                "enum": STATUS_ENUM
            },
            "explanation": {
                "type": "STRING",
                "description": "Una breve explicación en una oración sobre lo que mide este analito, en español."
            }
        },
        "required": ["name", "value", "unit", "range", "status", "explanation"]
    })
}

/// Schema for the interpretation response:
/// `{ patientSummary, doctorSummary, specialistRecommendation }`.
pub fn interpretation_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "patientSummary": { "type": "STRING" },
            "doctorSummary": { "type": "STRING" },
            "specialistRecommendation": { "type": "STRING" }
        },
        "required": ["patientSummary", "doctorSummary", "specialistRecommendation"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_schema_lists_all_analyte_fields() {
        let schema = extraction_response_schema();
        let item = &schema["properties"]["analytes"]["items"];
        let required: Vec<&str> = item["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(
            required,
            ["name", "value", "unit", "range", "status", "explanation"]
        );
    }

    #[test]
    fn status_enum_is_the_clean_four_way_set() {
        let schema = extraction_response_schema();
        let statuses = &schema["properties"]["analytes"]["items"]["properties"]["status"]["enum"];
        assert_eq!(statuses.as_array().unwrap().len(), 4);
        // The mojibake form must never leak into the wire contract.
        assert!(!statuses.to_string().contains("LÃ­mite"));
        assert!(statuses.to_string().contains("Límite"));
    }

    #[test]
    fn status_enum_values_deserialize_into_the_model() {
        for label in STATUS_ENUM {
            let json = format!("\"{label}\"");
            assert!(
                serde_json::from_str::<crate::models::AnalyteStatus>(&json).is_ok(),
                "schema status {label} must parse into AnalyteStatus"
            );
        }
    }

    #[test]
    fn interpretation_schema_requires_three_keys() {
        let schema = interpretation_response_schema();
        let required = schema["required"].as_array().unwrap();
        assert_eq!(required.len(), 3);
        for key in ["patientSummary", "doctorSummary", "specialistRecommendation"] {
            assert!(required.iter().any(|v| v == key));
            assert_eq!(schema["properties"][key]["type"], "STRING");
        }
    }
}
