//! Search engine trait

use std::fmt::Debug;

use async_trait::async_trait;

use super::{EtfDocument, StructuredQuery};
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Executes compiled queries against an ETF index
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SearchEngine: Send + Sync + Debug {
    /// Runs the query and returns hits in ranked order
    async fn execute(&self, query: &StructuredQuery) -> Result<Vec<EtfDocument>, DomainError>;

    /// Engine name for logging
    fn engine_name(&self) -> &'static str;
}
