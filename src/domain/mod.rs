//! Domain layer - Core business logic and entities

pub mod cache;
pub mod criteria;
pub mod error;
pub mod llm;
pub mod outcome;
pub mod search;

pub use cache::{Cache, CacheExt, CacheFailure};
pub use criteria::{
    canonical_key, ExtractionFailure, ExtractionOutcome, InvestmentCriteria,
    InvestmentCriteriaBuilder,
};
pub use error::DomainError;
pub use llm::{LlmProvider, LlmRequest, LlmRequestBuilder, LlmResponse, Message, MessageRole, Usage};
pub use outcome::Outcome;
pub use search::{
    build_query, EtfDocument, EtfRecord, FilterClause, SearchEngine, SearchFailure,
    SearchOutcome, SortClause, SortOrder, StructuredQuery,
};
