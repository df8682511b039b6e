//! View models for the SPA — the JSON shapes the three result tabs render,
//! plus the fixed copy for the idle and loading states.
//!
//! Status → color mapping and all user-visible strings live here so the
//! frontend stays a dumb renderer.

use chrono::Utc;
use rand::Rng;
use serde::Serialize;
use uuid::Uuid;

use crate::models::{Analyte, AnalyteStatus, LabReport};
use crate::trend::{synthesize_trend, TrendSeries, NO_CHART_DATA_MESSAGE};

/// Always appended below results.
pub const DISCLAIMER: &str =
    "Aviso Legal: Esta herramienta es solo para fines informativos y no sustituye el consejo, \
     diagnóstico o tratamiento médico profesional. Siempre busca el consejo de tu médico u otro \
     proveedor de salud calificado con cualquier pregunta que puedas tener sobre una condición \
     médica. Nunca ignores el consejo médico profesional ni demores en buscarlo por algo que \
     hayas leído en esta aplicación.";

/// Fixed progress message while the pipeline runs.
pub const LOADING_MESSAGE: &str = "La IA está analizando tu informe...";

/// Onboarding blurb for the idle state.
pub const WELCOME_MESSAGE: &str =
    "Sube una imagen o PDF de tu informe de laboratorio, indica la edad y el sexo del paciente, \
     y recibe un desglose claro de tus resultados.";

/// Color token for a status, as the table rows use it.
pub fn status_color(status: AnalyteStatus) -> &'static str {
    match status {
        AnalyteStatus::Normal => "green",
        AnalyteStatus::High => "red",
        AnalyteStatus::Low => "yellow",
        AnalyteStatus::Borderline => "orange",
    }
}

/// One row of the "Resultados Detallados" table.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyteRow {
    pub name: String,
    pub value: String,
    pub unit: String,
    pub reference_range: String,
    /// Spanish status label ("Alto", "Normal", ...).
    pub status: &'static str,
    pub status_color: &'static str,
    /// Hover tooltip: the one-sentence explanation.
    pub tooltip: String,
}

impl AnalyteRow {
    fn from_analyte(analyte: &Analyte) -> Self {
        Self {
            name: analyte.name.clone(),
            value: analyte.value.clone(),
            unit: analyte.unit.clone(),
            reference_range: analyte.range.clone(),
            status: analyte.status.label(),
            status_color: status_color(analyte.status),
            tooltip: analyte.explanation.clone(),
        }
    }
}

/// The "Tendencias Históricas" tab.
#[derive(Debug, Clone, Serialize)]
pub struct TrendView {
    pub chartable: bool,
    /// Caption over the chart, or the no-data explanation.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series: Option<TrendSeries>,
}

/// Build the trend tab for a report.
pub fn build_trend_view(report: &LabReport, rng: &mut impl Rng) -> TrendView {
    match synthesize_trend(&report.analytes, Utc::now().date_naive(), rng) {
        Some(series) => TrendView {
            chartable: true,
            message: format!(
                "Este gráfico muestra una tendencia simulada para {} durante el último año. \
                 Para tendencias reales, sube múltiples informes a lo largo del tiempo.",
                series.analyte_name
            ),
            series: Some(series),
        },
        None => TrendView {
            chartable: false,
            message: NO_CHART_DATA_MESSAGE.to_string(),
            series: None,
        },
    }
}

/// Everything the results view renders across its tabs.
#[derive(Debug, Clone, Serialize)]
pub struct ReportView {
    pub analysis_id: Uuid,
    /// "Conclusiones Clave para Ti" — plain-language summary.
    pub patient_summary: String,
    pub specialist_recommendation: String,
    /// "Resumen Técnico para Médicos".
    pub doctor_summary: String,
    pub analytes: Vec<AnalyteRow>,
    pub abnormal_count: usize,
    pub trend: TrendView,
    pub disclaimer: &'static str,
}

/// Assemble the full results view from a finished report.
pub fn build_report_view(analysis_id: Uuid, report: &LabReport, rng: &mut impl Rng) -> ReportView {
    ReportView {
        analysis_id,
        patient_summary: report.patient_summary.clone(),
        specialist_recommendation: report.specialist_recommendation.clone(),
        doctor_summary: report.doctor_summary.clone(),
        analytes: report.analytes.iter().map(AnalyteRow::from_analyte).collect(),
        abnormal_count: report.abnormal_count(),
        trend: build_trend_view(report, rng),
        disclaimer: DISCLAIMER,
    }
}
