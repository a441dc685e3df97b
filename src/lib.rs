//! ETF Discovery API
//!
//! Semantic search over an ETF catalogue:
//! - Investment criteria extracted from free text by a local LLM (Ollama)
//! - Structured queries against Elasticsearch or an in-memory index
//! - Result caching keyed by the extracted criteria (Redis or moka)

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use api::state::AppState;
use config::{CacheSettings, SearchConfig, SearchEngineKind};
use domain::search::SearchEngine;
use infrastructure::{
    cache::{CacheConfig, CacheFactory, CacheType},
    http_client::HttpClient,
    llm::OllamaProvider,
    search::{sample_etfs, ElasticsearchClient, InMemorySearchEngine},
    services::{
        CachedSearchService, CriteriaExtractor, ExtractorConfig, SearchCacheConfig, SearchClient,
        SemanticSearchService,
    },
};
use tracing::info;

/// Create the application state with default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let llm_client = HttpClient::with_timeout(Duration::from_secs(config.llm.timeout_secs))?;
    let provider = Arc::new(OllamaProvider::with_base_url(llm_client, &config.llm.host));
    let extractor = CriteriaExtractor::with_config(
        provider,
        ExtractorConfig {
            model: config.llm.model.clone(),
            temperature: config.llm.temperature,
        },
    );

    info!(
        host = %config.llm.host,
        model = %config.llm.model,
        "Criteria extraction configured"
    );

    let engine = create_search_engine(&config.search).await?;
    let search = SearchClient::new(engine).with_max_results(config.search.max_results);

    let cache = CacheFactory::new()
        .create(&cache_config(&config.cache)?)
        .await?;

    info!(
        backend = cache.backend_name(),
        enabled = config.cache.enabled,
        ttl_secs = config.cache.ttl_secs,
        "Search cache configured"
    );

    let cached_search =
        CachedSearchService::with_config(cache, search, search_cache_config(&config.cache));

    let semantic_search = SemanticSearchService::new(extractor, cached_search);

    Ok(AppState::new(Arc::new(semantic_search)))
}

async fn create_search_engine(config: &SearchConfig) -> anyhow::Result<Arc<dyn SearchEngine>> {
    match config.engine {
        SearchEngineKind::Elasticsearch => {
            let client = HttpClient::with_timeout(Duration::from_secs(config.timeout_secs))?;

            info!(url = %config.url, index = %config.index, "Using Elasticsearch search engine");
            Ok(Arc::new(ElasticsearchClient::new(
                client,
                &config.url,
                &config.index,
            )))
        }
        SearchEngineKind::InMemory => {
            let engine = InMemorySearchEngine::with_documents(sample_etfs());

            info!(documents = engine.len().await, "Using in-memory search engine");
            Ok(Arc::new(engine))
        }
    }
}

fn cache_config(settings: &CacheSettings) -> anyhow::Result<CacheConfig> {
    let config = match settings.backend.parse::<CacheType>()? {
        CacheType::InMemory => CacheConfig::in_memory(),
        CacheType::Redis => CacheConfig::redis(&settings.redis_url),
    };

    Ok(config
        .with_key_prefix(&settings.key_prefix)
        .with_connection_timeout(Duration::from_millis(settings.connect_timeout_ms))
        .with_max_capacity(settings.max_capacity))
}

fn search_cache_config(settings: &CacheSettings) -> SearchCacheConfig {
    let config = SearchCacheConfig::default()
        .with_namespace(&settings.namespace)
        .with_ttl(Duration::from_secs(settings.ttl_secs))
        .with_single_flight(settings.single_flight);

    if settings.enabled {
        config
    } else {
        config.disabled()
    }
}
