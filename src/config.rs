//! Application configuration, read once from the environment at startup.
//!
//! The only secret is the Gemini API key. It is deliberately optional at
//! startup so the server can boot without it (health endpoint reports
//! `ai_configured: false`); the analysis pipeline refuses to run without it.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Clarolab";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> String {
    "clarolab=info,tower_http=info".to_string()
}

/// Runtime configuration for the server and the Gemini boundary.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Gemini API key (`GEMINI_API_KEY`). `None` until the user sets one.
    pub api_key: Option<String>,
    /// Base URL of the Gemini REST API. Overridable for tests/proxies.
    pub gemini_base_url: String,
    /// Model used for the document → analytes extraction stage.
    pub extraction_model: String,
    /// Model used for the analytes → summaries interpretation stage.
    pub interpretation_model: String,
    /// Per-request HTTP timeout in seconds.
    pub request_timeout_secs: u64,
    /// Address the HTTP server binds to. Local-only by default.
    pub bind_addr: SocketAddr,
    /// Directory of the static SPA served at `/`.
    pub ui_dir: PathBuf,
}

impl AppConfig {
    /// Read configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());

        let gemini_base_url = std::env::var("CLAROLAB_GEMINI_URL")
            .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string());

        let extraction_model = std::env::var("CLAROLAB_EXTRACTION_MODEL")
            .unwrap_or_else(|_| "gemini-2.5-flash".to_string());

        let interpretation_model = std::env::var("CLAROLAB_INTERPRETATION_MODEL")
            .unwrap_or_else(|_| "gemini-2.5-pro".to_string());

        let request_timeout_secs = std::env::var("CLAROLAB_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(120);

        let bind_addr = std::env::var("CLAROLAB_BIND")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8787)));

        let ui_dir = std::env::var("CLAROLAB_UI_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("ui"));

        Self {
            api_key,
            gemini_base_url,
            extraction_model,
            interpretation_model,
            request_timeout_secs,
            bind_addr,
            ui_dir,
        }
    }
}
