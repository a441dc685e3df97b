//! Language-model criteria extraction

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, error, info, warn};

use crate::domain::criteria::{ExtractionFailure, ExtractionOutcome, InvestmentCriteria};
use crate::domain::llm::{LlmProvider, LlmRequest};
use crate::domain::Outcome;
use crate::infrastructure::metrics;

/// Matches a fenced code block, with or without a `json` language tag
static FENCED_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```[a-zA-Z]*\s*(.*?)\s*```").unwrap());

/// Model settings for extraction
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub model: String,
    pub temperature: f64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            model: "llama3:8b".to_string(),
            temperature: 0.1,
        }
    }
}

/// Turns a free-text investment query into [`InvestmentCriteria`]
///
/// Never fails: any provider error or unusable answer yields the default
/// criteria together with the reason.
#[derive(Debug)]
pub struct CriteriaExtractor {
    provider: Arc<dyn LlmProvider>,
    config: ExtractorConfig,
}

impl CriteriaExtractor {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self::with_config(provider, ExtractorConfig::default())
    }

    pub fn with_config(provider: Arc<dyn LlmProvider>, config: ExtractorConfig) -> Self {
        Self { provider, config }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub async fn extract(&self, query: &str) -> ExtractionOutcome {
        info!(
            provider = self.provider.provider_name(),
            model = %self.config.model,
            query = %query,
            "Extracting investment criteria"
        );

        let request = LlmRequest::builder()
            .user(build_prompt(query))
            .temperature(self.config.temperature)
            .build();

        let outcome = match self.provider.chat(&self.config.model, request).await {
            Ok(response) => match response.content() {
                Some(content) => {
                    debug!(raw_response = %content, "Language model answered");
                    parse_criteria(content)
                }
                None => Outcome::degraded(
                    InvestmentCriteria::default(),
                    ExtractionFailure::EmptyResponse,
                ),
            },
            Err(e) => {
                error!(error = %e, "Language model call failed");
                Outcome::degraded(
                    InvestmentCriteria::default(),
                    ExtractionFailure::Provider(e.to_string()),
                )
            }
        };

        match outcome.reason() {
            None => {
                info!(criteria = ?outcome.value(), "Criteria extracted");
                metrics::record_extraction("success");
            }
            Some(reason) => {
                warn!(reason = %reason, "Falling back to default criteria");
                metrics::record_extraction(reason.as_label());
            }
        }

        outcome
    }
}

fn build_prompt(query: &str) -> String {
    format!(
        r#"Tu es un assistant spécialisé dans l'analyse de requêtes d'investissement ETF.
Analyse cette requête : "{query}"

Retourne UNIQUEMENT un JSON valide avec cette structure exacte :
{{
    "sectors": [],
    "fees_max": null,
    "min_performance": null,
    "region": [],
    "type": [],
    "replication": null,
    "availability": [],
    "risk": null,
    "strategy": null,
    "esg": null,
    "emetteur": []
}}

Règles d'extraction :
- Secteurs : "technologie" → ["technologie"], "ESG" → ["esg"]
- Frais : "frais <0.5%" → "fees_max": 0.5
- Performance : "rendement >3%" → "min_performance": 3.0
- Région : "ETF Europe" → ["europe"]
- Si aucun critère clair, laisse les valeurs par défaut
- Ne retourne QUE le JSON, sans commentaires"#
    )
}

/// Locates the JSON object in a model answer
///
/// Prefers the content of a fenced code block; otherwise falls back to the
/// span between the first `{` and the last `}`.
fn extract_json(content: &str) -> Option<&str> {
    let body = FENCED_BLOCK
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map_or(content, |m| m.as_str())
        .trim();

    if body.starts_with('{') && body.ends_with('}') {
        return Some(body);
    }

    let start = body.find('{')?;
    let end = body.rfind('}')?;

    (start < end).then(|| &body[start..=end])
}

fn parse_criteria(content: &str) -> ExtractionOutcome {
    let Some(json) = extract_json(content) else {
        return Outcome::degraded(
            InvestmentCriteria::default(),
            ExtractionFailure::MalformedJson("no JSON object in response".to_string()),
        );
    };

    match serde_json::from_str::<InvestmentCriteria>(json) {
        Ok(criteria) => Outcome::Complete(criteria),
        Err(e) => {
            warn!(error = %e, content = %json, "Unparseable criteria JSON");
            Outcome::degraded(
                InvestmentCriteria::default(),
                ExtractionFailure::MalformedJson(e.to_string()),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::llm::MockLlmProvider;

    fn extractor(provider: MockLlmProvider) -> (CriteriaExtractor, Arc<MockLlmProvider>) {
        let provider = Arc::new(provider);
        (CriteriaExtractor::new(provider.clone()), provider)
    }

    #[tokio::test]
    async fn test_subset_output_leaves_defaults() {
        let (extractor, provider) = extractor(
            MockLlmProvider::new("mock")
                .with_content(r#"{"sectors": ["technologie"], "fees_max": 0.5}"#),
        );

        let outcome = extractor.extract("ETF technologie frais <0.5%").await;

        assert!(!outcome.is_degraded());
        let criteria = outcome.into_value();
        assert_eq!(
            criteria,
            InvestmentCriteria::builder()
                .sector("technologie")
                .fees_max(0.5)
                .build()
        );
        assert_eq!(criteria.min_performance(), None);
        assert!(criteria.region().is_empty());

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, "llama3:8b");
        assert_eq!(requests[0].1.temperature, Some(0.1));
        assert!(requests[0].1.messages[0]
            .content
            .contains("Analyse cette requête : \"ETF technologie frais <0.5%\""));
    }

    #[tokio::test]
    async fn test_fenced_json_is_unwrapped() {
        let (extractor, _) = extractor(MockLlmProvider::new("mock").with_content(
            "Voici les critères :\n```json\n{\"region\": [\"Europe\"], \"esg\": 1}\n```\nBonne recherche !",
        ));

        let criteria = extractor.extract("ETF Europe ESG").await.into_value();

        assert!(criteria.region().contains("europe"));
        assert_eq!(criteria.esg(), Some(1));
    }

    #[tokio::test]
    async fn test_non_json_output_falls_back_to_defaults() {
        let (extractor, _) = extractor(
            MockLlmProvider::new("mock").with_content("Désolé, je ne peux pas répondre."),
        );

        let outcome = extractor.extract("bonjour").await;

        assert!(matches!(
            outcome.reason(),
            Some(ExtractionFailure::MalformedJson(_))
        ));
        assert!(outcome.value().is_empty());
    }

    #[tokio::test]
    async fn test_truncated_json_falls_back_to_defaults() {
        let (extractor, _) = extractor(
            MockLlmProvider::new("mock").with_content(r#"{"sectors": ["technologie"], "fees_"#),
        );

        let outcome = extractor.extract("ETF tech").await;

        assert!(outcome.is_degraded());
        assert_eq!(outcome.into_value(), InvestmentCriteria::default());
    }

    #[tokio::test]
    async fn test_wrong_field_type_falls_back_to_defaults() {
        let (extractor, _) = extractor(
            MockLlmProvider::new("mock").with_content(r#"{"fees_max": {"max": 0.5}}"#),
        );

        let outcome = extractor.extract("frais bas").await;

        assert!(matches!(
            outcome.reason(),
            Some(ExtractionFailure::MalformedJson(_))
        ));
    }

    #[tokio::test]
    async fn test_provider_error_falls_back_to_defaults() {
        let (extractor, _) =
            extractor(MockLlmProvider::new("mock").with_error("connection refused"));

        let outcome = extractor.extract("ETF Europe").await;

        assert!(matches!(outcome.reason(), Some(ExtractionFailure::Provider(_))));
        assert_eq!(outcome.into_value(), InvestmentCriteria::default());
    }

    #[tokio::test]
    async fn test_blank_answer_is_empty_response() {
        let (extractor, _) = extractor(MockLlmProvider::new("mock").with_content("  "));

        let outcome = extractor.extract("ETF Europe").await;

        assert_eq!(outcome.reason(), Some(&ExtractionFailure::EmptyResponse));
    }

    #[test]
    fn test_extract_json_variants() {
        assert_eq!(extract_json("{\"a\": 1}"), Some("{\"a\": 1}"));
        assert_eq!(extract_json("```\n{\"a\": 1}\n```"), Some("{\"a\": 1}"));
        assert_eq!(
            extract_json("Réponse: {\"a\": {\"b\": 2}} fin"),
            Some("{\"a\": {\"b\": 2}}")
        );
        assert_eq!(extract_json("} rien {"), None);
        assert_eq!(extract_json("aucun objet"), None);
    }

    #[test]
    fn test_custom_model() {
        let extractor = CriteriaExtractor::with_config(
            Arc::new(MockLlmProvider::new("mock")),
            ExtractorConfig {
                model: "mistral:7b".to_string(),
                temperature: 0.0,
            },
        );

        assert_eq!(extractor.model(), "mistral:7b");
    }
}
