use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::TextGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
/// Nothing here is mutable: each submission keeps its own results.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// The Gemini client in production; a scripted generator in tests.
    pub generator: Arc<dyn TextGenerator>,
}
