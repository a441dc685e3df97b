//! ETF documents returned by the search engine

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A ranked search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EtfDocument {
    /// Engine-side document identifier
    pub id: String,
    /// Relevance score, absent when results are sorted by a field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Indexed ETF record
    pub source: EtfRecord,
}

impl EtfDocument {
    pub fn new(id: impl Into<String>, source: EtfRecord) -> Self {
        Self {
            id: id.into(),
            score: None,
            source,
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }
}

/// Indexed ETF fields
///
/// The fields the pipeline filters and sorts on are typed; everything else the
/// index holds (region, strategy, issuer, ...) is kept verbatim in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EtfRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fees: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance_1y: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EtfRecord {
    pub fn new(name: impl Into<String>, isin: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            isin: Some(isin.into()),
            ..Default::default()
        }
    }

    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }

    pub fn with_fees(mut self, fees: f64) -> Self {
        self.fees = Some(fees);
        self
    }

    pub fn with_performance_1y(mut self, performance: f64) -> Self {
        self.performance_1y = Some(performance);
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.extra.insert(name.into(), value);
        self
    }

    /// Returns the value of an indexed field by name
    pub fn field(&self, name: &str) -> Option<Value> {
        match name {
            "name" => self.name.clone().map(Value::String),
            "isin" => self.isin.clone().map(Value::String),
            "sector" => self.sector.clone().map(Value::String),
            "fees" => self.fees.map(Value::from),
            "performance_1y" => self.performance_1y.map(Value::from),
            other => self.extra.get(other).cloned(),
        }
    }

    /// Whether the record carries every field an ETF listing requires
    pub fn is_complete(&self) -> bool {
        self.isin.is_some()
            && self.name.is_some()
            && self.fees.is_some()
            && self.performance_1y.is_some()
    }
}
