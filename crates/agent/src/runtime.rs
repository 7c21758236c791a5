use async_trait::async_trait;
use cartwise_core::domain::conversation::{ConversationState, StateUpdate};
use cartwise_core::flows::{GraphEngine, GraphNode, GraphRun, NodeRunner, ShoppingGraph};
use tracing::debug;

use crate::errors::AgentError;
use crate::router::IntentRouter;
use crate::search::SearchExecutor;

/// Runs one conversation turn through the shopping graph.
///
/// Holds no per-conversation state, so a single runtime can serve concurrent
/// callers; each call owns the state it was given.
pub struct AgentRuntime {
    router: IntentRouter,
    search: SearchExecutor,
    engine: GraphEngine<ShoppingGraph>,
}

impl AgentRuntime {
    pub fn new(router: IntentRouter, search: SearchExecutor) -> Self {
        Self { router, search, engine: GraphEngine::default() }
    }

    pub fn router(&self) -> &IntentRouter {
        &self.router
    }

    pub async fn advance(&self, state: ConversationState) -> Result<ConversationState, AgentError> {
        Ok(self.advance_traced(state).await?.state)
    }

    /// Like [`advance`](Self::advance), also reporting the states visited and
    /// the nodes executed.
    pub async fn advance_traced(&self, state: ConversationState) -> Result<GraphRun, AgentError> {
        let run = self.engine.run(state, self).await?;
        debug!(
            event_name = "agent.turn.completed",
            nodes = run.nodes_executed.len(),
            messages = run.state.messages.len(),
            "conversation turn completed"
        );
        Ok(run)
    }
}

#[async_trait]
impl NodeRunner for AgentRuntime {
    type Error = AgentError;

    async fn run_node(
        &self,
        node: GraphNode,
        state: &ConversationState,
    ) -> Result<StateUpdate, Self::Error> {
        match node {
            GraphNode::Router => {
                let decision = self.router.route(&state.messages).await?;
                Ok(decision.into_update())
            }
            GraphNode::Search => {
                let filters = state.active_search_filters.clone().unwrap_or_default();
                Ok(StateUpdate::with_message(self.search.search(&filters).await))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use cartwise_core::domain::conversation::{
        ConversationState, Message, Role, SearchFilters, SortBy,
    };
    use cartwise_core::domain::product::{ProductId, ProductRecord};
    use cartwise_core::domain::routing::RouterDecision;
    use cartwise_core::flows::{GraphNode, GraphState};

    use super::AgentRuntime;
    use crate::classifier::Classifier;
    use crate::embedding::HashingEmbedder;
    use crate::errors::{AgentError, RoutingError};
    use crate::hydrate::hydrate_index;
    use crate::index::InMemoryProductIndex;
    use crate::router::IntentRouter;
    use crate::rules::{RuleBasedClassifier, GREETING_REPLY};
    use crate::search::{SearchExecutor, SearchSettings};

    fn product(id: &str, title: &str, price: f64, category: &str) -> ProductRecord {
        ProductRecord {
            id: ProductId(id.to_string()),
            title: title.to_string(),
            description: format!("Premium quality {}.", category.to_lowercase()),
            price,
            category: category.to_string(),
            color: "Black".to_string(),
            size: "M".to_string(),
            stock: 5,
        }
    }

    async fn runtime_with(classifier: Arc<dyn Classifier>) -> AgentRuntime {
        let catalog = vec![
            product("prod-0001", "Men's Black Winter Jacket (Clearance)", 99.0, "Winter Jacket"),
            product("prod-0002", "Women's Navy Winter Jacket", 150.0, "Winter Jacket"),
            product("prod-0003", "Unisex Grey Winter Jacket", 3_200.0, "Winter Jacket"),
            product("prod-0004", "Graphite Pencil Set", 80.0, "Graphite Pencil Set"),
            product("prod-0005", "Unisex Beige Sun Hat", 450.0, "Sun Hat"),
        ];
        let embedder = Arc::new(HashingEmbedder::new(384));
        let index = Arc::new(InMemoryProductIndex::new("ecommerce_products"));
        hydrate_index(&catalog, embedder.clone(), index.as_ref()).await.expect("hydrate");

        AgentRuntime::new(
            IntentRouter::new(classifier),
            SearchExecutor::new(embedder, index, SearchSettings::default()),
        )
    }

    fn entry_state(text: &str) -> ConversationState {
        ConversationState::from_history(vec![Message::user(text)])
    }

    #[tokio::test]
    async fn greeting_ends_with_chat_reply_and_no_filters() {
        let runtime = runtime_with(Arc::new(RuleBasedClassifier::new())).await;
        let run = runtime.advance_traced(entry_state("Hello there!")).await.expect("turn");

        assert_eq!(run.visited, vec![GraphState::Start, GraphState::Routed, GraphState::Done]);
        assert_eq!(run.state.messages.len(), 2);
        let last = run.state.last_message().expect("reply");
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(last.content, GREETING_REPLY);
        assert!(run.state.active_search_filters.is_none());
    }

    #[tokio::test]
    async fn budget_jacket_request_lists_clearance_item_only() {
        let runtime = runtime_with(Arc::new(RuleBasedClassifier::new())).await;
        let run = runtime
            .advance_traced(entry_state("Find me a jacket under 100 INR"))
            .await
            .expect("turn");

        assert_eq!(run.nodes_executed, vec![GraphNode::Router, GraphNode::Search]);
        assert_eq!(
            run.state.active_search_filters,
            Some(SearchFilters::new("jacket", 100.0, SortBy::Relevance))
        );
        let reply = &run.state.last_message().expect("reply").content;
        assert!(reply.starts_with("Here are the top matches I found:"));
        assert!(reply.contains("Men's Black Winter Jacket (Clearance)"));
        assert!(!reply.contains("Women's Navy Winter Jacket"));
    }

    #[tokio::test]
    async fn messages_only_grow_with_prefix_preserved() {
        let runtime = runtime_with(Arc::new(RuleBasedClassifier::new())).await;
        let history = vec![
            Message::user("hi"),
            Message::assistant(GREETING_REPLY),
            Message::user("cheapest winter jacket"),
        ];

        let state = runtime
            .advance(ConversationState::from_history(history.clone()))
            .await
            .expect("turn");

        assert_eq!(state.messages.len(), history.len() + 1);
        assert_eq!(&state.messages[..history.len()], history.as_slice());
    }

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
    async fn chat_decision_reply_is_last_message_and_filters_unchanged() {
        let runtime = runtime_with(Arc::new(FixedClassifier(RouterDecision::chat(
            "Our store ships across India.",
        ))))
        .await;
        let mut state = entry_state("do you ship to pune?");
        state.active_search_filters = Some(SearchFilters::new("hat", 500.0, SortBy::Relevance));

        let result = runtime.advance(state.clone()).await.expect("turn");

        assert_eq!(
            result.last_message().map(|message| message.content.as_str()),
            Some("Our store ships across India.")
        );
        assert_eq!(result.active_search_filters, state.active_search_filters);
    }

    #[tokio::test]
    async fn search_decision_reply_comes_from_search_executor() {
        let runtime = runtime_with(Arc::new(FixedClassifier(RouterDecision {
            chat_reply: "Searching now...".to_string(),
            ..RouterDecision::search(SearchFilters::new("sun hat", 0.0, SortBy::PriceDesc))
        })))
        .await;

        let run = runtime.advance_traced(entry_state("premium sun hat")).await.expect("turn");

        assert_eq!(run.visited.last(), Some(&GraphState::Done));
        assert!(run.visited.contains(&GraphState::Searched));
        let reply = &run.state.last_message().expect("reply").content;
        assert_ne!(reply, "Searching now...");
        assert!(reply.contains("Unisex Beige Sun Hat"));
    }

    #[tokio::test]
    async fn empty_history_is_a_turn_failure() {
        let runtime = runtime_with(Arc::new(RuleBasedClassifier::new())).await;
        let error = runtime
            .advance(ConversationState::default())
            .await
            .expect_err("empty history must fail");
        assert!(matches!(error, AgentError::Routing(RoutingError::EmptyHistory)));
    }

    #[tokio::test]
    async fn repeated_turns_produce_identical_filters() {
        let runtime = runtime_with(Arc::new(RuleBasedClassifier::new())).await;
        let first = runtime.advance(entry_state("black jacket below 5000")).await.expect("turn");
        let second = runtime.advance(entry_state("black jacket below 5000")).await.expect("turn");

        assert_eq!(first.active_search_filters, second.active_search_filters);
        assert_eq!(first, second);
    }
}
