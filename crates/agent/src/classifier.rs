use std::sync::Arc;

use async_trait::async_trait;
use cartwise_core::domain::conversation::Message;
use cartwise_core::domain::routing::RouterDecision;

use crate::errors::RoutingError;
use crate::llm::LlmClient;

pub const ROUTER_SYSTEM_PROMPT: &str = r#"You are an intelligent AI shopping assistant for an Indian fashion and lifestyle e-commerce store.
Analyze the user's latest message in the context of the conversation and route it.
- Greetings, small talk and questions that are not product requests: set "action" to "chat" and write a short, friendly reply in "chat_reply".
- Requests to find or buy something, for example "I want a jacket under 100 rs": set "action" to "search" and extract the constraints into "search_params".

Respond with a single JSON object and nothing else:
{"action": "search" | "chat", "search_params": {"query": string, "max_price": number, "sort_by": "relevance" | "price_asc" | "price_desc"}, "chat_reply": string}

Rules for search_params:
- "query" is a short semantic product description such as "warm jacket for ski trip". Use "" when there is none.
- "max_price" is the maximum price in INR. For "under 100" it is 100. Use 0 when no budget is given.
- "sort_by" is "price_asc" for cheapest or lowest price requests, "price_desc" for most expensive or premium requests, otherwise "relevance".
- Every extracted value must be plain ASCII. Never include quotes or apostrophes: write "mens jacket", not "men's jacket".
- Always include every field, using the defaults above when a value is unknown."#;

/// Decides between a conversational reply and a product search.
#[async_trait]
pub trait Classifier: Send + Sync {
    fn name(&self) -> &'static str;

    async fn classify(&self, history: &[Message]) -> Result<RouterDecision, RoutingError>;
}

/// Classifier backed by a schema-constrained language model call.
pub struct LlmClassifier {
    client: Arc<dyn LlmClient>,
}

impl LlmClassifier {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Classifier for LlmClassifier {
    fn name(&self) -> &'static str {
        "llm"
    }

    async fn classify(&self, history: &[Message]) -> Result<RouterDecision, RoutingError> {
        let raw = self.client.complete_json(ROUTER_SYSTEM_PROMPT, history).await?;
        parse_decision(&raw)
    }
}

pub fn parse_decision(raw: &str) -> Result<RouterDecision, RoutingError> {
    serde_json::from_str::<RouterDecision>(raw.trim())
        .map_err(|error| RoutingError::Schema(error.to_string()))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use cartwise_core::domain::conversation::{Message, SortBy};
    use cartwise_core::domain::routing::RouteAction;

    use super::{parse_decision, Classifier, LlmClassifier, ROUTER_SYSTEM_PROMPT};
    use crate::errors::RoutingError;
    use crate::llm::{LlmClient, LlmError};

    struct CannedClient {
        reply: String,
        seen_prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl LlmClient for CannedClient {
        async fn complete_json(
            &self,
            system_prompt: &str,
            _history: &[Message],
        ) -> Result<String, LlmError> {
            if let Ok(mut prompts) = self.seen_prompts.lock() {
                prompts.push(system_prompt.to_string());
            }
            Ok(self.reply.clone())
        }
    }

    #[tokio::test]
    async fn llm_classifier_sends_router_prompt_and_decodes_reply() {
        let client = Arc::new(CannedClient {
            reply: r#"{"action":"search","search_params":{"query":"sun hat","max_price":500,"sort_by":"price_asc"},"chat_reply":""}"#.to_string(),
            seen_prompts: Mutex::new(Vec::new()),
        });
        let classifier = LlmClassifier::new(client.clone());

        let decision = classifier
            .classify(&[Message::user("cheapest sun hat under 500")])
            .await
            .expect("decision");

        assert_eq!(decision.action, RouteAction::Search);
        assert_eq!(decision.search_params.query, "sun hat");
        assert_eq!(decision.search_params.max_price, 500.0);
        assert_eq!(decision.search_params.sort_by, SortBy::PriceAsc);
        let prompts = client.seen_prompts.lock().expect("lock").clone();
        assert_eq!(prompts, vec![ROUTER_SYSTEM_PROMPT.to_string()]);
    }

    #[test]
    fn malformed_output_is_a_schema_error() {
        let result = parse_decision(r#"{"action":"search","search_params":{"query":"men"s jacket"}}"#);
        assert!(matches!(result, Err(RoutingError::Schema(_))));

        let result = parse_decision("Sure! Here are some jackets.");
        assert!(matches!(result, Err(RoutingError::Schema(_))));
    }

    #[test]
    fn prompt_forbids_quotes_in_extracted_values() {
        assert!(ROUTER_SYSTEM_PROMPT.contains("Never include quotes or apostrophes"));
        assert!(ROUTER_SYSTEM_PROMPT.contains("Use 0 when no budget is given"));
    }
}
