//! Pipeline metrics
//!
//! Recorded through the `metrics` facade into the Prometheus recorder that
//! [`init_metrics`] installs.

use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::config::MetricsConfig;

/// Installs the global Prometheus recorder
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusHandle> {
    if !config.enabled {
        tracing::info!("Metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            gauge!("etf_discovery_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
            tracing::info!("Metrics recorder installed");
            Some(handle)
        }
        Err(e) => {
            tracing::error!("Failed to install metrics recorder: {}", e);
            None
        }
    }
}

/// Cache lookup result label values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    Hit,
    Miss,
    Bypass,
}

impl CacheOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Miss => "miss",
            Self::Bypass => "bypass",
        }
    }
}

/// Record a criteria extraction, `status` is `success` or a failure label
pub fn record_extraction(status: &'static str) {
    counter!("criteria_extraction_total", "status" => status).increment(1);
}

pub fn record_cache_lookup(outcome: CacheOutcome) {
    counter!("etf_search_cache_total", "outcome" => outcome.as_str()).increment(1);
}

pub fn record_engine_error(engine: &'static str) {
    counter!("etf_search_engine_errors_total", "engine" => engine).increment(1);
}

/// Record end-to-end semantic search latency
pub fn record_search_duration(duration: Duration) {
    histogram!("semantic_search_duration_seconds").record(duration.as_secs_f64());
}
