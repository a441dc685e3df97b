//! Cache domain - Key-value store abstraction with expiring entries

mod repository;

pub use repository::{Cache, CacheExt};

#[cfg(test)]
pub use repository::mock::MockCache;

use thiserror::Error;

use super::DomainError;

/// Why the cache was bypassed for a search
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheFailure {
    #[error("cache store unavailable: {0}")]
    Unavailable(String),

    #[error("cache value could not be (de)serialized: {0}")]
    Serialization(String),
}

impl From<DomainError> for CacheFailure {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Serialization { message } => Self::Serialization(message),
            other => Self::Unavailable(other.to_string()),
        }
    }
}
