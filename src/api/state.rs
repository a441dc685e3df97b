//! Application state for shared services

use std::sync::Arc;

use crate::infrastructure::services::SemanticSearchService;

/// Services shared by every request handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub semantic_search: Arc<SemanticSearchService>,
}

impl AppState {
    pub fn new(semantic_search: Arc<SemanticSearchService>) -> Self {
        Self { semantic_search }
    }
}
