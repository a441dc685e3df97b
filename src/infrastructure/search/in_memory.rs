//! In-memory search engine for development and testing

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::domain::search::{
    EtfDocument, FilterClause, SearchEngine, SortClause, SortOrder, StructuredQuery,
};
use crate::domain::DomainError;

/// Default result size, matching Elasticsearch's own default
const DEFAULT_SIZE: usize = 10;

/// Evaluates structured queries over documents held in memory
#[derive(Debug, Default, Clone)]
pub struct InMemorySearchEngine {
    documents: Arc<RwLock<Vec<EtfDocument>>>,
}

impl InMemorySearchEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_documents(documents: Vec<EtfDocument>) -> Self {
        Self {
            documents: Arc::new(RwLock::new(documents)),
        }
    }

    /// Adds or replaces a document by id
    pub async fn index(&self, document: EtfDocument) {
        let mut docs = self.documents.write().await;

        match docs.iter_mut().find(|d| d.id == document.id) {
            Some(existing) => *existing = document,
            None => docs.push(document),
        }
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }
}

#[async_trait]
impl SearchEngine for InMemorySearchEngine {
    async fn execute(&self, query: &StructuredQuery) -> Result<Vec<EtfDocument>, DomainError> {
        let docs = self.documents.read().await;

        let mut hits: Vec<EtfDocument> = docs
            .iter()
            .filter(|doc| query.filters.iter().all(|f| matches_filter(doc, f)))
            .cloned()
            .collect();

        hits.sort_by(|a, b| compare_by(a, b, &query.sort));
        hits.truncate(query.size.map_or(DEFAULT_SIZE, |s| s as usize));

        Ok(hits)
    }

    fn engine_name(&self) -> &'static str {
        "in_memory"
    }
}

/// Check if a document satisfies one filter clause
fn matches_filter(doc: &EtfDocument, filter: &FilterClause) -> bool {
    let Some(value) = doc.source.field(filter.field()) else {
        return false;
    };

    match filter {
        FilterClause::Terms { values, .. } => match &value {
            Value::String(s) => values.iter().any(|v| v == s),
            Value::Array(items) => items
                .iter()
                .filter_map(Value::as_str)
                .any(|s| values.iter().any(|v| v == s)),
            _ => false,
        },
        FilterClause::Range { gte, lte, .. } => {
            let Some(n) = value.as_f64() else {
                return false;
            };

            gte.is_none_or(|min| n >= min) && lte.is_none_or(|max| n <= max)
        }
    }
}

/// Orders two documents by the sort clauses; missing values sort last
fn compare_by(a: &EtfDocument, b: &EtfDocument, sort: &[SortClause]) -> Ordering {
    for clause in sort {
        let left = sort_key(a, &clause.field);
        let right = sort_key(b, &clause.field);

        let ordering = match (left, right) {
            (Some(l), Some(r)) => {
                let natural = l.partial_cmp(&r).unwrap_or(Ordering::Equal);
                match clause.order {
                    SortOrder::Asc => natural,
                    SortOrder::Desc => natural.reverse(),
                }
            }
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };

        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    Ordering::Equal
}

fn sort_key(doc: &EtfDocument, field: &str) -> Option<f64> {
    doc.source.field(field).and_then(|v| v.as_f64())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::search::{build_query, EtfRecord, FEES_FIELD, PERFORMANCE_FIELD};
    use crate::domain::InvestmentCriteria;
    use serde_json::json;

    fn etf(id: &str, sector: &str, fees: f64, perf: f64) -> EtfDocument {
        EtfDocument::new(
            id,
            EtfRecord::new(format!("ETF {}", id), format!("FR000000000{}", id))
                .with_sector(sector)
                .with_fees(fees)
                .with_performance_1y(perf),
        )
    }

    fn engine() -> InMemorySearchEngine {
        InMemorySearchEngine::with_documents(vec![
            etf("1", "monde", 0.38, 8.5),
            etf("2", "technologie", 0.35, 15.2),
            etf("3", "esg", 0.25, 6.8),
            etf("4", "technologie", 0.60, 22.0),
        ])
    }

    fn ids(docs: &[EtfDocument]) -> Vec<&str> {
        docs.iter().map(|d| d.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_empty_query_returns_all_best_first() {
        let query = build_query(&InvestmentCriteria::default());

        let hits = engine().execute(&query).await.unwrap();

        assert_eq!(ids(&hits), vec!["4", "2", "1", "3"]);
    }

    #[tokio::test]
    async fn test_sector_and_fees_filter() {
        let criteria = InvestmentCriteria::builder()
            .sector("technologie")
            .fees_max(0.5)
            .build();

        let hits = engine().execute(&build_query(&criteria)).await.unwrap();

        assert_eq!(ids(&hits), vec!["2"]);
    }

    #[tokio::test]
    async fn test_range_bounds_are_inclusive() {
        let query = StructuredQuery::new()
            .with_filter(FilterClause::at_most(FEES_FIELD, 0.35))
            .with_filter(FilterClause::at_least(PERFORMANCE_FIELD, 6.8));

        let hits = engine().execute(&query).await.unwrap();

        assert_eq!(ids(&hits), vec!["2", "3"]);
    }

    #[tokio::test]
    async fn test_missing_field_never_matches() {
        let engine = InMemorySearchEngine::with_documents(vec![EtfDocument::new(
            "x",
            EtfRecord::new("No fees", "LU0000000000"),
        )]);

        let query = StructuredQuery::new().with_filter(FilterClause::at_most(FEES_FIELD, 10.0));

        assert!(engine.execute(&query).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_terms_match_array_fields() {
        let engine = InMemorySearchEngine::with_documents(vec![EtfDocument::new(
            "1",
            EtfRecord::new("Amundi", "FR0010315770").with_field("region", json!(["monde", "usa"])),
        )]);

        let query = StructuredQuery::new().with_filter(FilterClause::terms("region", ["usa"]));

        assert_eq!(engine.execute(&query).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_sort_values_last_and_size() {
        let engine = engine();
        engine
            .index(EtfDocument::new("5", EtfRecord::new("New", "IE0000000005")))
            .await;

        let query = build_query(&InvestmentCriteria::default()).with_size(5);
        let hits = engine.execute(&query).await.unwrap();
        assert_eq!(hits.last().unwrap().id, "5");

        let query = build_query(&InvestmentCriteria::default()).with_size(2);
        assert_eq!(ids(&engine.execute(&query).await.unwrap()), vec!["4", "2"]);
    }

    #[tokio::test]
    async fn test_index_replaces_by_id() {
        let engine = engine();

        engine.index(etf("1", "monde", 0.20, 9.0)).await;

        assert_eq!(engine.len().await, 4);
    }
}
