use std::sync::Arc;

use cinematch_retrieval::RefinementPipeline;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Pipeline over the cache loaded at startup.
    pub pipeline: Arc<RefinementPipeline>,
}

impl AppState {
    pub fn new(pipeline: RefinementPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }

    /// Keywords in the loaded cache.
    pub fn keywords_loaded(&self) -> usize {
        self.pipeline.catalog_size()
    }

    /// Whether both providers have an API key.
    pub fn openai_configured(&self) -> bool {
        self.pipeline.providers_configured()
    }
}
