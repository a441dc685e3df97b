//! Layered application configuration

mod app_config;

pub use app_config::{
    AppConfig, CacheSettings, LlmConfig, LogFormat, LoggingConfig, MetricsConfig, SearchConfig,
    SearchEngineKind, ServerConfig,
};
