use async_trait::async_trait;
use std::fmt::Debug;

use super::{LlmRequest, LlmResponse};
use crate::domain::DomainError;

/// Trait for chat-completion language model providers
#[async_trait]
pub trait LlmProvider: Send + Sync + Debug {
    /// Send a chat completion request
    async fn chat(&self, model: &str, request: LlmRequest) -> Result<LlmResponse, DomainError>;

    /// Lists the models installed on the provider
    async fn list_models(&self) -> Result<Vec<String>, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}
