//! Seed command - creates the ETF index and loads the sample ETFs

use std::time::Duration;

use anyhow::Context;
use tracing::info;

use crate::infrastructure::http_client::{HttpClient, HttpClientTrait};
use crate::infrastructure::search::{sample_etfs, ElasticsearchClient};

pub async fn run() -> anyhow::Result<()> {
    let config = super::bootstrap();

    let client = HttpClient::with_timeout(Duration::from_secs(config.search.timeout_secs))?;
    let engine = ElasticsearchClient::new(client, &config.search.url, &config.search.index);

    let indexed = seed(&engine).await?;
    info!(index = %config.search.index, indexed, "Search index seeded");

    Ok(())
}

async fn seed<C: HttpClientTrait>(engine: &ElasticsearchClient<C>) -> anyhow::Result<usize> {
    if engine
        .ensure_index()
        .await
        .context("Failed to create the search index")?
    {
        info!(index = %engine.index(), "Index created with ETF mapping");
    }

    let samples = sample_etfs();

    for doc in &samples {
        engine
            .index_document(&doc.id, &doc.source)
            .await
            .with_context(|| format!("Failed to index ETF {}", doc.id))?;
    }

    engine.refresh().await.context("Failed to refresh the index")?;

    Ok(samples.len())
}
