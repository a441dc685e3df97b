//! Semantic search request and response bodies

use serde::{Deserialize, Serialize};

use crate::domain::{EtfDocument, InvestmentCriteria};
use crate::infrastructure::services::SemanticSearchResult;

#[derive(Debug, Clone, Deserialize)]
pub struct SemanticSearchRequest {
    pub query: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SemanticSearchResponse {
    pub criteria: InvestmentCriteria,
    pub results: Vec<EtfDocument>,
    pub search_time: f64,
}

impl From<SemanticSearchResult> for SemanticSearchResponse {
    fn from(result: SemanticSearchResult) -> Self {
        Self {
            criteria: result.criteria,
            results: result.results,
            search_time: result.search_time,
        }
    }
}
