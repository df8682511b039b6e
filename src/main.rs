use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use clarolab::api::{app_router, ApiContext};
use clarolab::config::{self, AppConfig};
use clarolab::gemini::GeminiClient;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    let app_config = AppConfig::from_env();
    tracing::info!(
        version = config::APP_VERSION,
        bind = %app_config.bind_addr,
        "Starting {}",
        config::APP_NAME
    );
    if app_config.api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY is not set; analysis requests will fail until it is");
    }

    let gemini = Arc::new(GeminiClient::from_config(&app_config));
    let bind_addr = app_config.bind_addr;
    let ctx = ApiContext::new(app_config, gemini);
    let router = app_router(ctx);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!(addr = %bind_addr, "Listening");
    axum::serve(listener, router).await
}
