use std::sync::Arc;

use cartwise_core::domain::conversation::Message;
use cartwise_core::domain::routing::RouterDecision;
use tracing::info;

use crate::classifier::Classifier;
use crate::errors::RoutingError;

pub struct IntentRouter {
    classifier: Arc<dyn Classifier>,
}

impl IntentRouter {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self { classifier }
    }

    pub fn classifier_name(&self) -> &'static str {
        self.classifier.name()
    }

    /// Classifies the latest turn. A decision that breaks the extraction
    /// contract is rejected as a schema error rather than repaired.
    pub async fn route(&self, history: &[Message]) -> Result<RouterDecision, RoutingError> {
        if history.is_empty() {
            return Err(RoutingError::EmptyHistory);
        }

        let decision = self.classifier.classify(history).await?;
        decision.validate().map_err(|error| RoutingError::Schema(error.to_string()))?;

        info!(
            event_name = "agent.router.decided",
            classifier = self.classifier.name(),
            action = decision.action.as_str(),
            sort_by = decision.search_params.sort_by.as_str(),
            max_price = decision.search_params.max_price,
            history_len = history.len(),
            "router decision made"
        );

        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use cartwise_core::domain::conversation::{Message, SearchFilters, SortBy};
    use cartwise_core::domain::routing::RouterDecision;

    use super::IntentRouter;
    use crate::classifier::Classifier;
    use crate::errors::RoutingError;
    use crate::rules::RuleBasedClassifier;

    struct FixedClassifier(RouterDecision);

    #[async_trait]
    impl Classifier for FixedClassifier {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn classify(&self, _history: &[Message]) -> Result<RouterDecision, RoutingError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn empty_history_is_rejected() {
        let router = IntentRouter::new(Arc::new(RuleBasedClassifier::new()));
        let result = router.route(&[]).await;
        assert!(matches!(result, Err(RoutingError::EmptyHistory)));
    }

    #[tokio::test]
    async fn quoted_extraction_is_a_schema_error() {
        let decision =
            RouterDecision::search(SearchFilters::new("men's jacket", 0.0, SortBy::Relevance));
        let router = IntentRouter::new(Arc::new(FixedClassifier(decision)));

        let result = router.route(&[Message::user("men's jacket")]).await;
        assert!(matches!(result, Err(RoutingError::Schema(_))));
    }

    #[tokio::test]
    async fn identical_history_routes_identically() {
        let router = IntentRouter::new(Arc::new(RuleBasedClassifier::new()));
        let history = vec![Message::user("cheapest wireless earbuds under 3000")];

        let first = router.route(&history).await.expect("first decision");
        let second = router.route(&history).await.expect("second decision");

        assert_eq!(first, second);
        assert_eq!(first.search_params.sort_by, SortBy::PriceAsc);
    }
}
