//! Elasticsearch search engine

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::domain::search::{
    EtfDocument, EtfRecord, FilterClause, SearchEngine, StructuredQuery,
};
use crate::domain::DomainError;
use crate::infrastructure::http_client::HttpClientTrait;

/// Elasticsearch client for the ETF index
#[derive(Debug)]
pub struct ElasticsearchClient<C: HttpClientTrait> {
    client: C,
    base_url: String,
    index: String,
}

impl<C: HttpClientTrait> ElasticsearchClient<C> {
    pub fn new(client: C, base_url: impl Into<String>, index: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            index: index.into(),
        }
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    fn index_url(&self) -> String {
        format!("{}/{}", self.base_url, self.index)
    }

    /// Translates a structured query into the Query DSL
    pub fn build_request(query: &StructuredQuery) -> Value {
        let must: Vec<Value> = query.filters.iter().map(filter_to_dsl).collect();
        let sort: Vec<Value> = query
            .sort
            .iter()
            .map(|s| json!({ (s.field.clone()): { "order": s.order.as_str() } }))
            .collect();

        let mut body = json!({
            "query": { "bool": { "must": must } },
            "sort": sort,
        });

        if let Some(size) = query.size {
            body["size"] = json!(size);
        }

        body
    }

    fn parse_hits(json: Value) -> Result<Vec<EtfDocument>, DomainError> {
        let response: SearchResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::serialization(format!("Unexpected search response: {}", e))
        })?;

        Ok(response
            .hits
            .hits
            .into_iter()
            .map(|hit| {
                let doc = EtfDocument::new(hit.id, hit.source);
                match hit.score {
                    Some(score) => doc.with_score(score),
                    None => doc,
                }
            })
            .collect())
    }

    /// Creates the index with the ETF mapping unless it already exists
    ///
    /// Returns whether the index was created.
    pub async fn ensure_index(&self) -> Result<bool, DomainError> {
        let url = self.index_url();

        if self.client.head(&url).await? {
            return Ok(false);
        }

        self.client.put_json(&url, &etf_index_mapping()).await?;
        tracing::info!(index = %self.index, "Created search index");

        Ok(true)
    }

    /// Indexes or replaces one ETF record
    pub async fn index_document(&self, id: &str, record: &EtfRecord) -> Result<(), DomainError> {
        let url = format!("{}/_doc/{}", self.index_url(), id);
        let body = serde_json::to_value(record).map_err(|e| {
            DomainError::serialization(format!("Failed to serialize ETF record: {}", e))
        })?;

        self.client.put_json(&url, &body).await?;
        Ok(())
    }

    /// Makes recently indexed documents visible to search
    pub async fn refresh(&self) -> Result<(), DomainError> {
        let url = format!("{}/_refresh", self.index_url());

        self.client.post_json(&url, vec![], &json!({})).await?;
        Ok(())
    }
}

#[async_trait]
impl<C: HttpClientTrait> SearchEngine for ElasticsearchClient<C> {
    async fn execute(&self, query: &StructuredQuery) -> Result<Vec<EtfDocument>, DomainError> {
        let url = format!("{}/_search", self.index_url());
        let body = Self::build_request(query);

        tracing::debug!(index = %self.index, body = %body, "Executing search");

        let response = self
            .client
            .post_json(&url, vec![("Content-Type", "application/json")], &body)
            .await
            .map_err(|e| match e {
                DomainError::Serialization { .. } => e,
                other => DomainError::search(other.to_string()),
            })?;

        Self::parse_hits(response)
    }

    fn engine_name(&self) -> &'static str {
        "elasticsearch"
    }
}

fn filter_to_dsl(filter: &FilterClause) -> Value {
    match filter {
        FilterClause::Terms { field, values } => json!({ "terms": { (field.clone()): values } }),
        FilterClause::Range { field, gte, lte } => {
            let mut bounds = Map::new();

            if let Some(min) = gte {
                bounds.insert("gte".to_string(), json!(min));
            }
            if let Some(max) = lte {
                bounds.insert("lte".to_string(), json!(max));
            }

            json!({ "range": { (field.clone()): bounds } })
        }
    }
}

/// Field mapping of the ETF index
pub fn etf_index_mapping() -> Value {
    json!({
        "mappings": {
            "properties": {
                "name": {"type": "text"},
                "isin": {"type": "keyword"},
                "sector": {"type": "keyword"},
                "fees": {"type": "float"},
                "performance_1y": {"type": "float"},
                "region": {"type": "keyword"},
                "strategy": {"type": "text"},
                "esg_score": {"type": "integer"},
                "replication": {"type": "keyword"},
                "emetteur": {"type": "keyword"}
            }
        }
    })
}

// Elasticsearch response types

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
struct HitsEnvelope {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_score", default)]
    score: Option<f64>,
    #[serde(rename = "_source", default)]
    source: EtfRecord,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::search::build_query;
    use crate::domain::InvestmentCriteria;
    use crate::infrastructure::http_client::mock::MockHttpClient;
    use crate::infrastructure::http_client::HttpClient;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn search_response() -> Value {
        json!({
            "took": 3,
            "timed_out": false,
            "hits": {
                "total": {"value": 2, "relation": "eq"},
                "max_score": null,
                "hits": [
                    {
                        "_index": "etfs",
                        "_id": "2",
                        "_score": null,
                        "_source": {
                            "name": "Lyxor Nasdaq-100 UCITS ETF",
                            "isin": "FR0007063177",
                            "sector": "technologie",
                            "fees": 0.35,
                            "performance_1y": 15.2
                        },
                        "sort": [15.2]
                    },
                    {
                        "_index": "etfs",
                        "_id": "7",
                        "_score": 1.0,
                        "_source": {
                            "name": "iShares Digital",
                            "isin": "IE00BJ5JNY98",
                            "sector": "technologie",
                            "fees": 0.40,
                            "performance_1y": 11.0
                        }
                    }
                ]
            }
        })
    }

    #[test]
    fn test_request_body() {
        let criteria = InvestmentCriteria::builder()
            .sector("technologie")
            .fees_max(0.5)
            .min_performance(5.0)
            .build();

        let body = ElasticsearchClient::<MockHttpClient>::build_request(
            &build_query(&criteria).with_size(10),
        );

        assert_eq!(
            body,
            json!({
                "query": {"bool": {"must": [
                    {"terms": {"sector": ["technologie"]}},
                    {"range": {"fees": {"lte": 0.5}}},
                    {"range": {"performance_1y": {"gte": 5.0}}}
                ]}},
                "sort": [{"performance_1y": {"order": "desc"}}],
                "size": 10
            })
        );
    }

    #[test]
    fn test_empty_criteria_match_everything() {
        let body = ElasticsearchClient::<MockHttpClient>::build_request(&build_query(
            &InvestmentCriteria::default(),
        ));

        assert_eq!(body["query"]["bool"]["must"], json!([]));
        assert!(body.get("size").is_none());
    }

    #[tokio::test]
    async fn test_execute_parses_hits() {
        let client = MockHttpClient::new()
            .with_response("http://elasticsearch:9200/etfs/_search", search_response());
        let engine = ElasticsearchClient::new(client, "http://elasticsearch:9200/", "etfs");

        let docs = engine.execute(&StructuredQuery::new()).await.unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, "2");
        assert_eq!(docs[0].score, None);
        assert_eq!(docs[0].source.isin.as_deref(), Some("FR0007063177"));
        assert_eq!(docs[1].score, Some(1.0));
    }

    #[tokio::test]
    async fn test_engine_error_is_search_error() {
        let client = MockHttpClient::new()
            .with_error("http://elasticsearch:9200/etfs/_search", "connection refused");
        let engine = ElasticsearchClient::new(client, "http://elasticsearch:9200", "etfs");

        let result = engine.execute(&StructuredQuery::new()).await;

        assert!(matches!(result, Err(DomainError::Search { .. })));
    }

    #[tokio::test]
    async fn test_unreadable_response_is_serialization_error() {
        let client = MockHttpClient::new()
            .with_response("http://elasticsearch:9200/etfs/_search", json!({"acknowledged": true}));
        let engine = ElasticsearchClient::new(client, "http://elasticsearch:9200", "etfs");

        let result = engine.execute(&StructuredQuery::new()).await;

        assert!(matches!(result, Err(DomainError::Serialization { .. })));
    }

    #[tokio::test]
    async fn test_search_over_http() {
        let server = MockServer::start().await;
        let query = build_query(&InvestmentCriteria::builder().fees_max(0.5).build()).with_size(10);

        Mock::given(method("POST"))
            .and(path("/etfs/_search"))
            .and(body_json(ElasticsearchClient::<HttpClient>::build_request(&query)))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_response()))
            .expect(1)
            .mount(&server)
            .await;

        let engine = ElasticsearchClient::new(HttpClient::new(), server.uri(), "etfs");
        let docs = engine.execute(&query).await.unwrap();

        assert_eq!(docs.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_index_is_search_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/etfs/_search"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"type": "index_not_found_exception"},
                "status": 404
            })))
            .mount(&server)
            .await;

        let engine = ElasticsearchClient::new(HttpClient::new(), server.uri(), "etfs");
        let result = engine.execute(&StructuredQuery::new()).await;

        assert!(matches!(result, Err(DomainError::Search { .. })));
    }

    #[tokio::test]
    async fn test_ensure_index_keeps_existing_index() {
        let server = MockServer::start().await;

        Mock::given(method("HEAD"))
            .and(path("/etfs"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(0)
            .mount(&server)
            .await;

        let engine = ElasticsearchClient::new(HttpClient::new(), server.uri(), "etfs");

        assert!(!engine.ensure_index().await.unwrap());
    }

    #[tokio::test]
    async fn test_ensure_index_over_http() {
        let server = MockServer::start().await;

        Mock::given(method("HEAD"))
            .and(path("/etfs"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/etfs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"acknowledged": true})))
            .expect(1)
            .mount(&server)
            .await;

        let engine = ElasticsearchClient::new(HttpClient::new(), server.uri(), "etfs");

        assert!(engine.ensure_index().await.unwrap());
    }

    #[tokio::test]
    async fn test_index_document_and_refresh() {
        let client = MockHttpClient::new()
            .with_response("http://es:9200/etfs/_doc/1", json!({"result": "created"}))
            .with_response("http://es:9200/etfs/_refresh", json!({"_shards": {}}));
        let engine = ElasticsearchClient::new(client, "http://es:9200", "etfs");

        let record = EtfRecord::new("Amundi MSCI World", "FR0010315770").with_fees(0.38);
        engine.index_document("1", &record).await.unwrap();
        engine.refresh().await.unwrap();

        let requests = engine.client.requests();
        assert_eq!(requests[0].1["isin"], json!("FR0010315770"));
        assert_eq!(requests[1].0, "http://es:9200/etfs/_refresh");
    }
}
