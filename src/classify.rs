//! LLM-backed query classification.
//!
//! Every incoming question is mapped onto a closed eight-way taxonomy via
//! a schema-constrained completion. Classification never fails the chat
//! flow: any provider or parse error degrades to `Other`.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::core::config::LlmSettings;
use crate::core::errors::ApiError;
use crate::llm::provider::LlmProvider;
use crate::llm::types::{CompletionRequest, PromptMessage, ResponseFormat};

const CLASSIFIER_INSTRUCTIONS: &str = "You are an expert classifier for building materials and construction queries.
Analyze the query and classify it into one of the following categories:

Primary Types:
1. safety - Questions about safety procedures, PPE, handling hazards
2. installation - Questions about installation procedures, mounting, setup
3. specifications - Questions about technical specs, dimensions, properties
4. comparison - Questions comparing different materials or products
5. compliance - Questions about building codes and regulations
6. commercial - Questions about pricing, availability, purchasing
7. general - General inquiries about building materials
8. other - Queries not related to building materials or construction

Context: Building materials domain includes lumber, plywood, fasteners,
tools, construction materials, and related documentation.

Important:
- If the query is not related to building materials or construction,
  classify it as 'other'
- Only use 'general' for building material queries that don't fit other categories
- Be strict about keeping non-construction topics in 'other'";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum QueryLabel {
    Safety,
    Installation,
    Specifications,
    Comparison,
    Compliance,
    Commercial,
    General,
    Other,
}

impl QueryLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryLabel::Safety => "safety",
            QueryLabel::Installation => "installation",
            QueryLabel::Specifications => "specifications",
            QueryLabel::Comparison => "comparison",
            QueryLabel::Compliance => "compliance",
            QueryLabel::Commercial => "commercial",
            QueryLabel::General => "general",
            QueryLabel::Other => "other",
        }
    }
}

/// Classification of a building materials query.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct QueryType {
    pub primary_type: QueryLabel,
}

impl QueryType {
    pub fn other() -> Self {
        QueryType {
            primary_type: QueryLabel::Other,
        }
    }
}

pub struct QueryClassifier {
    provider: Arc<dyn LlmProvider>,
    model: String,
    temperature: f64,
}

impl QueryClassifier {
    pub fn new(provider: Arc<dyn LlmProvider>, settings: &LlmSettings) -> Self {
        Self {
            provider,
            model: settings.classifier_model.clone(),
            temperature: settings.classifier_temperature,
        }
    }

    /// Classify a query. Infallible: failures degrade to `other` so the
    /// chat flow never blocks on the classifier.
    pub async fn classify(&self, query: &str) -> QueryType {
        match self.try_classify(query).await {
            Ok(result) => {
                tracing::debug!("Query classified as: {}", result.primary_type.as_str());
                result
            }
            Err(err) => {
                tracing::warn!("Query classification failed, defaulting to 'other': {}", err);
                QueryType::other()
            }
        }
    }

    async fn try_classify(&self, query: &str) -> Result<QueryType, ApiError> {
        let schema = serde_json::to_value(schemars::schema_for!(QueryType))
            .map_err(ApiError::internal)?;
        let format = ResponseFormat {
            name: "query_type".to_string(),
            schema,
        };

        let request = CompletionRequest::new(vec![
            PromptMessage::system(CLASSIFIER_INSTRUCTIONS),
            PromptMessage::user(query),
        ])
        .with_temperature(self.temperature);

        let raw = self
            .provider
            .complete_structured(request, &self.model, format)
            .await?;

        serde_json::from_str(&raw).map_err(ApiError::internal)
    }
}
