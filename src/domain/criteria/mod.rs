//! Investment criteria domain - the filter contract shared by extraction,
//! query building and cache-key derivation

mod entity;
mod key;
mod lenient;

pub use entity::{InvestmentCriteria, InvestmentCriteriaBuilder};
pub use key::canonical_key;

use thiserror::Error;

use super::Outcome;

/// Why criteria extraction fell back to the default criteria
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionFailure {
    #[error("language model call failed: {0}")]
    Provider(String),

    #[error("language model returned no content")]
    EmptyResponse,

    #[error("language model output is not valid criteria JSON: {0}")]
    MalformedJson(String),
}

impl ExtractionFailure {
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Provider(_) => "provider_error",
            Self::EmptyResponse => "empty_response",
            Self::MalformedJson(_) => "malformed_json",
        }
    }
}

/// Result of criteria extraction; degraded outcomes carry default criteria
pub type ExtractionOutcome = Outcome<InvestmentCriteria, ExtractionFailure>;
