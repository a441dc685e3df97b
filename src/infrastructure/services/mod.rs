//! Application services

mod cached_search_service;
mod criteria_extractor;
mod search_client;
mod semantic_search_service;

pub use cached_search_service::{
    CachedSearchResult, CachedSearchService, ResultSource, SearchCacheConfig,
};
pub use criteria_extractor::{CriteriaExtractor, ExtractorConfig};
pub use search_client::SearchClient;
pub use semantic_search_service::{SemanticSearchResult, SemanticSearchService};
