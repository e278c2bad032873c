use std::sync::Arc;

use crate::config::Config;
use crate::store::TemplateStore;
use crate::template::completeness::ScoringTable;
use crate::workflow::pipeline::Pipeline;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Redis in production, in-process memory otherwise.
    pub store: Arc<dyn TemplateStore>,
    /// Step runner wrapping the configured text generator (Anthropic or offline).
    pub pipeline: Pipeline,
    pub scoring: Arc<ScoringTable>,
    pub config: Config,
}
