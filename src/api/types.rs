//! Shared request context handed to every handler.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::core_state::CoreState;
use crate::gemini::GenerativeClient;
use crate::pipeline::StageModels;

/// Everything the handlers need, cloned per request.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
    pub gemini: Arc<dyn GenerativeClient>,
    pub models: StageModels,
    pub config: Arc<AppConfig>,
}

impl ApiContext {
    pub fn new(config: AppConfig, gemini: Arc<dyn GenerativeClient>) -> Self {
        Self {
            core: Arc::new(CoreState::new()),
            gemini,
            models: StageModels::from_config(&config),
            config: Arc::new(config),
        }
    }

    /// Whether an API key is present, i.e. whether analysis can run at all.
    pub fn ai_configured(&self) -> bool {
        self.config.api_key.is_some()
    }
}
