//! Free-text ETF search: extraction followed by cached search

use std::time::Instant;

use serde::Serialize;
use tracing::info;

use crate::domain::criteria::InvestmentCriteria;
use crate::domain::search::EtfDocument;
use crate::infrastructure::metrics;

use super::cached_search_service::{CachedSearchService, ResultSource};
use super::criteria_extractor::CriteriaExtractor;

/// Response of a semantic search
#[derive(Debug, Clone, Serialize)]
pub struct SemanticSearchResult {
    pub criteria: InvestmentCriteria,
    pub results: Vec<EtfDocument>,
    /// Wall-clock seconds spent extracting and searching
    pub search_time: f64,
}

#[derive(Debug)]
pub struct SemanticSearchService {
    extractor: CriteriaExtractor,
    search: CachedSearchService,
}

impl SemanticSearchService {
    pub fn new(extractor: CriteriaExtractor, search: CachedSearchService) -> Self {
        Self { extractor, search }
    }

    pub fn cached_search(&self) -> &CachedSearchService {
        &self.search
    }

    pub async fn search(&self, query: &str) -> SemanticSearchResult {
        let started = Instant::now();

        let criteria = self.extractor.extract(query).await.into_value();
        let result = self.search.search(&criteria).await;

        let elapsed = started.elapsed();
        metrics::record_search_duration(elapsed);

        info!(
            results = result.documents.len(),
            from_cache = result.source == ResultSource::Cache,
            degraded = result.search_failure.is_some(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Semantic search completed"
        );

        SemanticSearchResult {
            criteria,
            results: result.documents,
            search_time: elapsed.as_secs_f64(),
        }
    }
}
