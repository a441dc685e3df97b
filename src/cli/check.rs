//! Check command - verifies the extraction model is installed

use std::time::Duration;

use anyhow::{bail, Context};
use tracing::info;

use crate::domain::LlmProvider;
use crate::infrastructure::http_client::HttpClient;
use crate::infrastructure::llm::OllamaProvider;

pub async fn run() -> anyhow::Result<()> {
    let config = super::bootstrap();

    let client = HttpClient::with_timeout(Duration::from_secs(config.llm.timeout_secs))?;
    let provider = OllamaProvider::with_base_url(client, &config.llm.host);

    check_model(&provider, &config.llm.model).await?;
    info!(model = %config.llm.model, host = %config.llm.host, "Model available");

    Ok(())
}

async fn check_model(provider: &dyn LlmProvider, model: &str) -> anyhow::Result<()> {
    let models = provider
        .list_models()
        .await
        .with_context(|| format!("Cannot reach {} to list models", provider.provider_name()))?;

    if !models.iter().any(|m| m == model) {
        bail!(
            "Model {} is not installed (available: {}). Run `ollama pull {}`",
            model,
            models.join(", "),
            model
        );
    }

    Ok(())
}
