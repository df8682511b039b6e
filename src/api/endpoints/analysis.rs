//! Analysis endpoints: submit a report, poll the lifecycle, fetch the trend.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::core_state::AnalysisState;
use crate::models::{PatientContext, Sex};
use crate::pipeline::{encode_document, run_analysis};
use crate::presentation::{
    build_report_view, build_trend_view, ReportView, TrendView, LOADING_MESSAGE, WELCOME_MESSAGE,
};

/// Shown when the form posted no file part.
pub const MISSING_FILE: &str = "Por favor, selecciona un archivo para analizar.";

/// Shown when a multipart part could not be read.
const UNREADABLE_FORM: &str = "No se pudo leer el formulario de subida.";

/// The lifecycle view the SPA polls.
#[derive(Debug, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AnalysisStateView {
    Idle {
        welcome: &'static str,
    },
    Loading {
        analysis_id: Uuid,
        started_at: DateTime<Utc>,
        message: &'static str,
    },
    Success {
        completed_at: DateTime<Utc>,
        report: ReportView,
    },
    Failure {
        message: String,
    },
}

/// `GET /api/analysis` — current lifecycle state.
pub async fn status(State(ctx): State<ApiContext>) -> Result<Json<AnalysisStateView>, ApiError> {
    let view = match ctx.core.snapshot()? {
        AnalysisState::Idle => AnalysisStateView::Idle {
            welcome: WELCOME_MESSAGE,
        },
        AnalysisState::Loading {
            analysis_id,
            started_at,
        } => AnalysisStateView::Loading {
            analysis_id,
            started_at,
            message: LOADING_MESSAGE,
        },
        AnalysisState::Success {
            analysis_id,
            completed_at,
            report,
        } => AnalysisStateView::Success {
            completed_at,
            report: build_report_view(analysis_id, &report, &mut rand::thread_rng()),
        },
        AnalysisState::Failure { message } => AnalysisStateView::Failure { message },
    };
    Ok(Json(view))
}

/// `POST /api/analysis` — multipart upload (`file`, `age`, `sex`), runs both
/// model stages and returns the finished report view.
///
/// Validation happens before the lifecycle transitions to loading, so a bad
/// form never clears a previous result. Only one analysis may run at a time;
/// a concurrent submission gets 409 without touching the model.
pub async fn submit(
    State(ctx): State<ApiContext>,
    mut multipart: Multipart,
) -> Result<Json<ReportView>, ApiError> {
    let mut file: Option<(String, Option<String>, Bytes)> = None;
    let mut patient = PatientContext::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::BadRequest(UNREADABLE_FORM.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("informe").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|_| ApiError::BadRequest(UNREADABLE_FORM.to_string()))?;
                file = Some((file_name, content_type, bytes));
            }
            "age" => {
                let text = field
                    .text()
                    .await
                    .map_err(|_| ApiError::BadRequest(UNREADABLE_FORM.to_string()))?;
                patient.age = text.trim().parse().ok();
            }
            "sex" => {
                let text = field
                    .text()
                    .await
                    .map_err(|_| ApiError::BadRequest(UNREADABLE_FORM.to_string()))?;
                patient.sex = Sex::parse(&text);
            }
            _ => {}
        }
    }

    let (file_name, content_type, bytes) =
        file.ok_or_else(|| ApiError::BadRequest(MISSING_FILE.to_string()))?;
    let validated = patient.validate().map_err(ApiError::BadRequest)?;
    let document = encode_document(&file_name, content_type.as_deref(), &bytes)?;

    let guard = ctx.core.begin_analysis()?;
    tracing::info!(
        analysis_id = %guard.analysis_id(),
        file = %file_name,
        mime = %document.mime_type,
        "Analysis submitted"
    );

    let gemini = Arc::clone(&ctx.gemini);
    let models = ctx.models.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        match run_analysis(gemini.as_ref(), &document, &validated, &models) {
            Ok(report) => {
                let analysis_id = guard.analysis_id();
                guard.succeed(report.clone());
                Ok((analysis_id, report))
            }
            Err(err) => {
                guard.fail(err.user_message());
                Err(err)
            }
        }
    })
    .await
    .map_err(|e| ApiError::Internal(format!("analysis task failed: {e}")))?;

    let (analysis_id, report) = outcome?;
    let view = build_report_view(analysis_id, &report, &mut rand::thread_rng());
    Ok(Json(view))
}

/// `GET /api/analysis/trend` — synthetic trend series for the current report.
pub async fn trend(State(ctx): State<ApiContext>) -> Result<Json<TrendView>, ApiError> {
    let (_, report) = ctx.core.current_report()?.ok_or(ApiError::NoReport)?;
    Ok(Json(build_trend_view(&report, &mut rand::thread_rng())))
}
