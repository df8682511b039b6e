//! Prompt construction for both analysis stages.
//!
//! All instructions demand Spanish output. The extraction prompt forbids
//! fabricating values: an illegible analyte is omitted, never guessed. The
//! interpretation prompt embeds the extracted analytes as pretty-printed
//! JSON so the model sees exactly what the parser accepted, in order.

use crate::models::{Analyte, ValidatedPatient};

/// Instruction for the document → analytes extraction stage.
pub fn build_extraction_prompt(patient: &ValidatedPatient) -> String {
    format!(
        "Eres una IA experta en el análisis de informes de laboratorio médico. \
         Tu tarea es extraer meticulosamente analitos específicos de la imagen del informe \
         de laboratorio proporcionada.\n\
         Toda la salida debe ser en español.\n\
         Contexto del paciente: Edad: {age}, Sexo: {sex}.\n\
         \n\
         Extrae todos los resultados de laboratorio disponibles de la imagen y estructúralos \
         de acuerdo con el esquema JSON proporcionado. Presta mucha atención a los valores, \
         unidades y rangos de referencia.\n\
         Determina el estado (Normal, Alto, Bajo, Límite) comparando el valor con el rango \
         de referencia, considerando los datos del paciente si es relevante.\n\
         Proporciona una breve explicación de una oración sobre el propósito de cada analito, \
         en español.\n\
         \n\
         Si un valor falta o es ilegible, omite ese analito del resultado. \
         No adivines ni inventes datos.",
        age = patient.age,
        sex = patient.sex.spanish_label(),
    )
}

/// Instruction for the analytes → summaries interpretation stage.
///
/// Returns an error only if the analyte list cannot be serialized, which
/// would indicate a bug rather than bad input.
pub fn build_interpretation_prompt(
    analytes: &[Analyte],
    patient: &ValidatedPatient,
) -> Result<String, serde_json::Error> {
    let analytes_json = serde_json::to_string_pretty(analytes)?;

    Ok(format!(
        "Eres un asistente médico de IA compasivo. Basado en los siguientes resultados de \
         laboratorio estructurados para un(a) paciente de {age} años de sexo {sex}, \
         genera tres resúmenes en español.\n\
         \n\
         Datos Extraídos:\n\
         {analytes_json}\n\
         \n\
         1. **Resumen para el Paciente:** Escribe un resumen claro, simple y tranquilizador \
         en un lenguaje sencillo y en español. Evita la jerga médica. Explica qué significan \
         los resultados clave, especialmente aquellos que están fuera del rango normal. \
         Comienza con los hallazgos más importantes. NO proporciones un diagnóstico ni \
         consejos médicos. Enfatiza que estos resultados deben ser discutidos con su médico.\n\
         \n\
         2. **Resumen para el Médico:** Escribe un resumen técnico y conciso en español para \
         un médico. Destaca los hallazgos anormales, lista los valores clave y menciona \
         posibles áreas de preocupación para seguimiento. Usa terminología médica profesional.\n\
         \n\
         3. **Recomendación de Especialista:** Basado en los hallazgos más significativos \
         (especialmente los valores marcadamente anormales), sugiere qué tipo de especialista \
         médico sería apropiado consultar (ej., \"Endocrinólogo\", \"Cardiólogo\", \
         \"Nefrólogo\", \"Urólogo\"). Si todos los resultados son normales, indica que un \
         médico de cabecera o de atención primaria es suficiente para el seguimiento de \
         rutina. Mantén la recomendación concisa y amigable.\n\
         \n\
         Devuelve la respuesta como un objeto JSON con tres claves: \"patientSummary\", \
         \"doctorSummary\" y \"specialistRecommendation\". Los valores de estas claves deben \
         estar en español.",
        age = patient.age,
        sex = patient.sex.spanish_label(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnalyteStatus, Sex};

    fn patient() -> ValidatedPatient {
        ValidatedPatient {
            age: 45,
            sex: Sex::Male,
        }
    }

    fn sample_analytes() -> Vec<Analyte> {
        vec![
            Analyte {
                name: "Glucosa".into(),
                value: "110".into(),
                unit: "mg/dL".into(),
                range: "70-99".into(),
                status: AnalyteStatus::High,
                explanation: "Mide el azúcar en sangre.".into(),
            },
            Analyte {
                name: "Creatinina".into(),
                value: "0.9".into(),
                unit: "mg/dL".into(),
                range: "0.7-1.3".into(),
                status: AnalyteStatus::Normal,
                explanation: "Evalúa la función renal.".into(),
            },
        ]
    }

    #[test]
    fn extraction_prompt_carries_patient_context() {
        let prompt = build_extraction_prompt(&patient());
        assert!(prompt.contains("Edad: 45"));
        assert!(prompt.contains("Sexo: Masculino"));
    }

    #[test]
    fn extraction_prompt_fixes_language_and_forbids_guessing() {
        let prompt = build_extraction_prompt(&patient());
        assert!(prompt.contains("Toda la salida debe ser en español."));
        assert!(prompt.contains("omite ese analito"));
        assert!(prompt.contains("No adivines ni inventes datos."));
    }

    #[test]
    fn extraction_prompt_names_the_four_statuses() {
        let prompt = build_extraction_prompt(&patient());
        assert!(prompt.contains("(Normal, Alto, Bajo, Límite)"));
    }

    #[test]
    fn interpretation_prompt_embeds_analytes_in_order() {
        let analytes = sample_analytes();
        let prompt = build_interpretation_prompt(&analytes, &patient()).unwrap();

        let glucosa = prompt.find("Glucosa").unwrap();
        let creatinina = prompt.find("Creatinina").unwrap();
        assert!(glucosa < creatinina, "analyte order must be preserved");
        assert!(prompt.contains("\"Alto\""));
        assert!(prompt.contains("45 años"));
        assert!(prompt.contains("Masculino"));
    }

    #[test]
    fn interpretation_prompt_asks_for_the_three_keys() {
        let prompt = build_interpretation_prompt(&sample_analytes(), &patient()).unwrap();
        assert!(prompt.contains("\"patientSummary\""));
        assert!(prompt.contains("\"doctorSummary\""));
        assert!(prompt.contains("\"specialistRecommendation\""));
        assert!(prompt.contains("NO proporciones un diagnóstico"));
    }
}
