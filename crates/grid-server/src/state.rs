use std::sync::Arc;

use grid_schema::{MetadataSource, SurveyStore};

/// Shared, read-mostly handles passed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub metadata: Arc<dyn MetadataSource>,
    pub store: Arc<dyn SurveyStore>,
}

impl AppState {
    pub fn new(
        metadata: impl MetadataSource + 'static,
        store: impl SurveyStore + 'static,
    ) -> Self {
        Self {
            metadata: Arc::new(metadata),
            store: Arc::new(store),
        }
    }
}
