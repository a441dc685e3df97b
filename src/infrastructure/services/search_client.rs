//! Fail-open wrapper around the search engine

use std::sync::Arc;

use tracing::{debug, error};

use crate::domain::search::{SearchEngine, SearchFailure, SearchOutcome, StructuredQuery};
use crate::domain::Outcome;
use crate::infrastructure::metrics;

/// Executes queries, turning engine errors into an empty degraded result
#[derive(Debug, Clone)]
pub struct SearchClient {
    engine: Arc<dyn SearchEngine>,
    max_results: Option<u32>,
}

impl SearchClient {
    pub fn new(engine: Arc<dyn SearchEngine>) -> Self {
        Self {
            engine,
            max_results: None,
        }
    }

    /// Caps the number of hits of queries that carry no size of their own
    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = Some(max_results);
        self
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.engine_name()
    }

    pub async fn execute(&self, query: &StructuredQuery) -> SearchOutcome {
        let sized;
        let query = match (query.size, self.max_results) {
            (None, Some(max)) => {
                sized = query.clone().with_size(max);
                &sized
            }
            _ => query,
        };

        match self.engine.execute(query).await {
            Ok(documents) => {
                debug!(
                    engine = self.engine.engine_name(),
                    hits = documents.len(),
                    "Search completed"
                );
                Outcome::Complete(documents)
            }
            Err(e) => {
                error!(engine = self.engine.engine_name(), error = %e, "Search failed");
                metrics::record_engine_error(self.engine.engine_name());
                Outcome::degraded(Vec::new(), SearchFailure::from(e))
            }
        }
    }
}
