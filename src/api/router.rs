//! Route table and middleware stack.
//!
//! Everything under `/api` is JSON; the SPA's static files are served from
//! the configured UI directory as the fallback. Responses are marked
//! non-cacheable: reports carry health data and must not land in shared
//! caches.

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue};
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;
use crate::pipeline::MAX_UPLOAD_BYTES;

/// Slack over the file cap for the other multipart fields and framing.
const BODY_LIMIT_SLACK: usize = 64 * 1024;

pub fn app_router(ctx: ApiContext) -> Router {
    let ui_dir = ctx.config.ui_dir.clone();

    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route(
            "/analysis",
            get(endpoints::analysis::status).post(endpoints::analysis::submit),
        )
        .route("/analysis/trend", get(endpoints::analysis::trend))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + BODY_LIMIT_SLACK))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(CorsLayer::permissive())
        .with_state(ctx);

    Router::new()
        .nest("/api", api)
        .fallback_service(ServeDir::new(ui_dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::config::AppConfig;
    use crate::gemini::{GeminiError, GenerativeClient, MockGenerativeClient};
    use crate::models::MISSING_PATIENT_DATA;
    use crate::pipeline::{INVALID_FILE_TYPE, SERVICE_BUSY_MESSAGE};

    const EXTRACTION_RESPONSE: &str = r#"{
        "analytes": [
            {"name": "Glucosa", "value": "110", "unit": "mg/dL",
             "range": "70-99", "status": "Alto",
             "explanation": "Mide el azúcar en sangre."}
        ]
    }"#;

    const INTERPRETATION_RESPONSE: &str = r#"{
        "patientSummary": "Tu glucosa está un poco elevada; coméntalo con tu médico.",
        "doctorSummary": "Glucemia 110 mg/dL (ref 70-99), hiperglucemia leve.",
        "specialistRecommendation": "Endocrinólogo"
    }"#;

    fn test_ctx(mock: MockGenerativeClient) -> (ApiContext, Arc<MockGenerativeClient>) {
        let mock = Arc::new(mock);
        let config = AppConfig {
            api_key: Some("test-key".into()),
            gemini_base_url: "http://127.0.0.1:0".into(),
            extraction_model: "gemini-2.5-flash".into(),
            interpretation_model: "gemini-2.5-pro".into(),
            request_timeout_secs: 5,
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            ui_dir: PathBuf::from("ui"),
        };
        let ctx = ApiContext::new(config, mock.clone() as Arc<dyn GenerativeClient>);
        (ctx, mock)
    }

    const BOUNDARY: &str = "clarolab-test-boundary";

    /// Hand-rolled multipart body; each entry is (name, file meta, data).
    fn multipart_request(parts: &[(&str, Option<(&str, &str)>, &[u8])]) -> Request<Body> {
        let mut body = Vec::new();
        for (name, file_meta, data) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match file_meta {
                Some((filename, content_type)) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; \
                         filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/analysis")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn standard_submission() -> Request<Body> {
        multipart_request(&[
            (
                "file",
                Some(("informe.png", "image/png")),
                b"fake image bytes".as_slice(),
            ),
            ("age", None, b"45".as_slice()),
            ("sex", None, b"Male".as_slice()),
        ])
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn health_reports_version_and_ai_flag() {
        let (ctx, _) = test_ctx(MockGenerativeClient::new());
        let router = app_router(ctx);

        let (status, json) = send(router, get_request("/api/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(json["ai_configured"], true);
    }

    #[tokio::test]
    async fn idle_state_includes_welcome_copy() {
        let (ctx, _) = test_ctx(MockGenerativeClient::new());
        let router = app_router(ctx);

        let (status, json) = send(router, get_request("/api/analysis")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["state"], "idle");
        assert!(json["welcome"].as_str().unwrap().contains("informe de laboratorio"));
    }

    #[tokio::test]
    async fn submit_runs_both_stages_and_returns_the_report() {
        let (ctx, mock) = test_ctx(
            MockGenerativeClient::new()
                .with_response(EXTRACTION_RESPONSE)
                .with_response(INTERPRETATION_RESPONSE),
        );
        let router = app_router(ctx);

        let (status, json) = send(router.clone(), standard_submission()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["analytes"][0]["name"], "Glucosa");
        assert_eq!(json["analytes"][0]["status"], "Alto");
        assert_eq!(json["analytes"][0]["status_color"], "red");
        assert_eq!(json["abnormal_count"], 1);
        assert!(!json["patient_summary"].as_str().unwrap().is_empty());
        assert!(!json["doctor_summary"].as_str().unwrap().is_empty());
        assert_eq!(json["specialist_recommendation"], "Endocrinólogo");
        assert!(json["trend"]["chartable"].as_bool().unwrap());
        assert!(json["disclaimer"].as_str().unwrap().starts_with("Aviso Legal"));
        assert_eq!(mock.call_count(), 2);

        // The lifecycle now reports success with the same report attached.
        let (status, json) = send(router.clone(), get_request("/api/analysis")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["state"], "success");
        assert_eq!(json["report"]["analytes"][0]["status"], "Alto");

        // And the trend endpoint serves the synthetic series.
        let (status, json) = send(router, get_request("/api/analysis/trend")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["series"]["analyte_name"], "Glucosa");
        assert_eq!(json["series"]["points"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn submit_without_file_is_rejected() {
        let (ctx, mock) = test_ctx(MockGenerativeClient::new());
        let router = app_router(ctx);

        let request = multipart_request(&[
            ("age", None, b"45".as_slice()),
            ("sex", None, b"Male".as_slice()),
        ]);
        let (status, json) = send(router, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("selecciona un archivo"));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn submit_without_patient_data_is_rejected() {
        let (ctx, mock) = test_ctx(MockGenerativeClient::new());
        let router = app_router(ctx);

        let request = multipart_request(&[(
            "file",
            Some(("informe.png", "image/png")),
            b"fake".as_slice(),
        )]);
        let (status, json) = send(router, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["message"], MISSING_PATIENT_DATA);
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn submit_with_unsupported_file_type_is_rejected() {
        let (ctx, mock) = test_ctx(MockGenerativeClient::new());
        let router = app_router(ctx);

        let request = multipart_request(&[
            ("file", Some(("notas.txt", "text/plain")), b"texto".as_slice()),
            ("age", None, b"45".as_slice()),
            ("sex", None, b"Female".as_slice()),
        ]);
        let (status, json) = send(router, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["message"], INVALID_FILE_TYPE);
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn oversized_upload_is_rejected_before_reaching_the_model() {
        let (ctx, mock) = test_ctx(MockGenerativeClient::new());
        let router = app_router(ctx);

        // File payload alone exceeds the body limit, framing aside.
        let oversized = vec![0u8; MAX_UPLOAD_BYTES + BODY_LIMIT_SLACK + 1];
        let request = multipart_request(&[
            (
                "file",
                Some(("informe.png", "image/png")),
                oversized.as_slice(),
            ),
            ("age", None, b"45".as_slice()),
            ("sex", None, b"Male".as_slice()),
        ]);
        let (status, json) = send(router, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("No se pudo leer"));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn upload_at_the_limit_passes_the_body_cap() {
        let (ctx, mock) = test_ctx(
            MockGenerativeClient::new()
                .with_response(EXTRACTION_RESPONSE)
                .with_response(INTERPRETATION_RESPONSE),
        );
        let router = app_router(ctx);

        let full_size = vec![0u8; MAX_UPLOAD_BYTES];
        let request = multipart_request(&[
            (
                "file",
                Some(("informe.png", "image/png")),
                full_size.as_slice(),
            ),
            ("age", None, b"45".as_slice()),
            ("sex", None, b"Male".as_slice()),
        ]);
        let (status, _) = send(router, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn concurrent_submission_is_rejected_without_calling_the_model() {
        let (ctx, mock) = test_ctx(MockGenerativeClient::new());
        let core = Arc::clone(&ctx.core);
        let router = app_router(ctx);

        // Simulate an analysis already running.
        let guard = core.begin_analysis().unwrap();

        let (status, json) = send(router, standard_submission()).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"]["code"], "ANALYSIS_IN_FLIGHT");
        assert_eq!(mock.call_count(), 0);
        guard.fail("x".into());
    }

    #[tokio::test]
    async fn overloaded_model_maps_to_503_and_records_failure() {
        let (ctx, mock) = test_ctx(
            MockGenerativeClient::new().with_error(GeminiError::Overloaded { status: 429 }),
        );
        let router = app_router(ctx);

        let (status, json) = send(router.clone(), standard_submission()).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["error"]["code"], "SERVICE_BUSY");
        assert_eq!(json["error"]["message"], SERVICE_BUSY_MESSAGE);
        assert_eq!(mock.call_count(), 1);

        let (_, json) = send(router, get_request("/api/analysis")).await;
        assert_eq!(json["state"], "failure");
        assert_eq!(json["message"], SERVICE_BUSY_MESSAGE);
    }

    #[tokio::test]
    async fn empty_extraction_maps_to_422() {
        let (ctx, mock) =
            test_ctx(MockGenerativeClient::new().with_response(r#"{"analytes": []}"#));
        let router = app_router(ctx);

        let (status, json) = send(router, standard_submission()).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["error"]["code"], "NO_ANALYTES");
        assert_eq!(mock.call_count(), 1, "interpretation must not fire");
    }

    #[tokio::test]
    async fn trend_without_a_report_is_404() {
        let (ctx, _) = test_ctx(MockGenerativeClient::new());
        let router = app_router(ctx);

        let (status, json) = send(router, get_request("/api/analysis/trend")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "NO_REPORT");
    }

    #[tokio::test]
    async fn api_responses_are_not_cacheable() {
        let (ctx, _) = test_ctx(MockGenerativeClient::new());
        let router = app_router(ctx);

        let response = router.oneshot(get_request("/api/health")).await.unwrap();
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).unwrap(),
            "no-store"
        );
    }
}
