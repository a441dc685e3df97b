//! Search domain - compiled queries, ETF documents and the engine seam

mod builder;
mod document;
mod engine;
mod query;

pub use builder::build_query;
pub use document::{EtfDocument, EtfRecord};
pub use engine::SearchEngine;
pub use query::{
    FilterClause, SortClause, SortOrder, StructuredQuery, FEES_FIELD, PERFORMANCE_FIELD,
    SECTOR_FIELD,
};

#[cfg(test)]
pub use engine::MockSearchEngine;

use thiserror::Error;

use super::{DomainError, Outcome};

/// Why a search degraded to an empty result list
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchFailure {
    #[error("search engine unavailable: {0}")]
    Engine(String),

    #[error("search engine returned an unreadable response: {0}")]
    InvalidResponse(String),
}

impl From<DomainError> for SearchFailure {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Serialization { message } => Self::InvalidResponse(message),
            other => Self::Engine(other.to_string()),
        }
    }
}

/// Result of executing a query; degraded outcomes carry an empty list
pub type SearchOutcome = Outcome<Vec<EtfDocument>, SearchFailure>;
