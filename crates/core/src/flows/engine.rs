use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::domain::conversation::{ConversationState, StateUpdate};
use crate::flows::states::{GraphEvent, GraphNode, GraphState, TransitionOutcome};

/// Upper bound on transitions per run. The shopping graph needs three.
const DEFAULT_MAX_TRANSITIONS: usize = 8;

pub trait GraphDefinition: Send + Sync {
    fn initial_state(&self) -> GraphState;

    /// The outgoing edge of `current`, chosen from the update produced by the
    /// node that ran when `current` was entered. `None` marks a terminal state.
    fn next_event(&self, current: &GraphState, last_update: &StateUpdate) -> Option<GraphEvent>;

    fn transition(
        &self,
        current: &GraphState,
        event: &GraphEvent,
    ) -> Result<TransitionOutcome, FlowTransitionError>;
}

/// Executes graph nodes on behalf of the engine.
#[async_trait]
pub trait NodeRunner: Send + Sync {
    type Error: From<FlowTransitionError> + Send;

    async fn run_node(
        &self,
        node: GraphNode,
        state: &ConversationState,
    ) -> Result<StateUpdate, Self::Error>;
}

/// Router, then search only when the router produced filters.
#[derive(Clone, Debug, Default)]
pub struct ShoppingGraph;

impl GraphDefinition for ShoppingGraph {
    fn initial_state(&self) -> GraphState {
        GraphState::Start
    }

    fn next_event(&self, current: &GraphState, last_update: &StateUpdate) -> Option<GraphEvent> {
        match current {
            GraphState::Start => Some(GraphEvent::Begin),
            GraphState::Routed if last_update.active_search_filters.is_some() => {
                Some(GraphEvent::FiltersProduced)
            }
            GraphState::Routed => Some(GraphEvent::NoFiltersProduced),
            GraphState::Searched => Some(GraphEvent::SearchCompleted),
            GraphState::Done => None,
        }
    }

    fn transition(
        &self,
        current: &GraphState,
        event: &GraphEvent,
    ) -> Result<TransitionOutcome, FlowTransitionError> {
        transition_shopping(current, event)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FlowTransitionError {
    #[error("invalid transition from {state:?} using event {event:?}")]
    InvalidTransition { state: GraphState, event: GraphEvent },
    #[error("graph run exceeded {limit} transitions without reaching a terminal state")]
    TransitionBudgetExceeded { limit: usize },
}

/// Result of one full pass through the graph.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphRun {
    pub state: ConversationState,
    /// Every state entered, starting with the initial one.
    pub visited: Vec<GraphState>,
    pub nodes_executed: Vec<GraphNode>,
}

pub struct GraphEngine<G> {
    graph: G,
    max_transitions: usize,
}

impl<G> GraphEngine<G>
where
    G: GraphDefinition,
{
    pub fn new(graph: G) -> Self {
        Self { graph, max_transitions: DEFAULT_MAX_TRANSITIONS }
    }

    pub fn with_max_transitions(mut self, max_transitions: usize) -> Self {
        self.max_transitions = max_transitions;
        self
    }

    pub fn initial_state(&self) -> GraphState {
        self.graph.initial_state()
    }

    pub fn apply(
        &self,
        current: &GraphState,
        event: &GraphEvent,
    ) -> Result<TransitionOutcome, FlowTransitionError> {
        self.graph.transition(current, event)
    }

    /// Drives `state` from the initial graph state to a terminal one, merging
    /// each node's partial update as it completes.
    pub async fn run<R>(&self, state: ConversationState, runner: &R) -> Result<GraphRun, R::Error>
    where
        R: NodeRunner,
    {
        let mut state = state;
        let mut current = self.graph.initial_state();
        let mut last_update = StateUpdate::empty();
        let mut visited = vec![current];
        let mut nodes_executed = Vec::new();
        let mut transitions = 0usize;

        while let Some(event) = self.graph.next_event(&current, &last_update) {
            if transitions >= self.max_transitions {
                return Err(FlowTransitionError::TransitionBudgetExceeded {
                    limit: self.max_transitions,
                }
                .into());
            }
            transitions += 1;

            let outcome = self.apply(&current, &event)?;
            last_update = StateUpdate::empty();
            for node in &outcome.actions {
                let update = runner.run_node(*node, &state).await?;
                state.merge(update.clone());
                last_update = update;
                nodes_executed.push(*node);
            }

            debug!(
                event_name = "flow.transition_applied",
                from = ?outcome.from,
                to = ?outcome.to,
                event = ?outcome.event,
                "graph transition applied"
            );
            current = outcome.to;
            visited.push(current);
        }

        Ok(GraphRun { state, visited, nodes_executed })
    }
}

impl Default for GraphEngine<ShoppingGraph> {
    fn default() -> Self {
        Self::new(ShoppingGraph)
    }
}

fn transition_shopping(
    current: &GraphState,
    event: &GraphEvent,
) -> Result<TransitionOutcome, FlowTransitionError> {
    use GraphEvent::{Begin, FiltersProduced, NoFiltersProduced, SearchCompleted};
    use GraphNode::{Router, Search};
    use GraphState::{Done, Routed, Searched, Start};

    let (to, actions) = match (current, event) {
        (Start, Begin) => (Routed, vec![Router]),
        (Routed, FiltersProduced) => (Searched, vec![Search]),
        (Routed, NoFiltersProduced) => (Done, Vec::new()),
        (Searched, SearchCompleted) => (Done, Vec::new()),
        _ => {
            return Err(FlowTransitionError::InvalidTransition { state: *current, event: *event });
        }
    };

    Ok(TransitionOutcome { from: *current, to, event: *event, actions })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::domain::conversation::{
        ConversationState, Message, SearchFilters, SortBy, StateUpdate,
    };
    use crate::flows::engine::{
        FlowTransitionError, GraphDefinition, GraphEngine, NodeRunner, ShoppingGraph,
    };
    use crate::flows::states::{GraphEvent, GraphNode, GraphState, TransitionOutcome};

    struct ScriptedRunner {
        router_update: StateUpdate,
        calls: Mutex<Vec<GraphNode>>,
    }

    impl ScriptedRunner {
        fn new(router_update: StateUpdate) -> Self {
            Self { router_update, calls: Mutex::new(Vec::new()) }
        }

        fn calls(&self) -> Vec<GraphNode> {
            self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl NodeRunner for ScriptedRunner {
        type Error = FlowTransitionError;

        async fn run_node(
            &self,
            node: GraphNode,
            state: &ConversationState,
        ) -> Result<StateUpdate, Self::Error> {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(node);
            }
            match node {
                GraphNode::Router => Ok(self.router_update.clone()),
                GraphNode::Search => {
                    let query = state
                        .active_search_filters
                        .as_ref()
                        .map(|filters| filters.query.clone())
                        .unwrap_or_default();
                    Ok(StateUpdate::with_message(Message::assistant(format!("results for {query}"))))
                }
            }
        }
    }

    fn entry_state(text: &str) -> ConversationState {
        ConversationState::from_history(vec![Message::user(text)])
    }

    #[tokio::test]
    async fn chat_route_terminates_after_router() {
        let engine = GraphEngine::default();
        let runner = ScriptedRunner::new(StateUpdate::with_message(Message::assistant("Hi!")));

        let run = engine.run(entry_state("Hello there!"), &runner).await.expect("run succeeds");

        assert_eq!(run.visited, vec![GraphState::Start, GraphState::Routed, GraphState::Done]);
        assert_eq!(runner.calls(), vec![GraphNode::Router]);
        assert_eq!(run.state.messages.len(), 2);
        assert_eq!(run.state.messages[1].content, "Hi!");
        assert!(run.state.active_search_filters.is_none());
    }

    #[tokio::test]
    async fn search_route_runs_search_after_router() {
        let engine = GraphEngine::default();
        let runner = ScriptedRunner::new(StateUpdate::with_filters(SearchFilters::new(
            "jacket",
            100.0,
            SortBy::Relevance,
        )));

        let run = engine.run(entry_state("jacket under 100"), &runner).await.expect("run succeeds");

        assert_eq!(
            run.visited,
            vec![GraphState::Start, GraphState::Routed, GraphState::Searched, GraphState::Done]
        );
        assert_eq!(run.nodes_executed, vec![GraphNode::Router, GraphNode::Search]);
        assert_eq!(
            run.state.last_message().map(|message| message.content.as_str()),
            Some("results for jacket")
        );
    }

    #[tokio::test]
    async fn preexisting_filters_do_not_trigger_search_on_chat() {
        let engine = GraphEngine::default();
        let runner = ScriptedRunner::new(StateUpdate::with_message(Message::assistant("Sure.")));
        let mut state = entry_state("thanks");
        state.active_search_filters = Some(SearchFilters::new("hat", 0.0, SortBy::Relevance));

        let run = engine.run(state.clone(), &runner).await.expect("run succeeds");

        assert_eq!(runner.calls(), vec![GraphNode::Router]);
        assert_eq!(run.state.active_search_filters, state.active_search_filters);
    }

    #[test]
    fn done_has_no_outgoing_edge() {
        assert_eq!(ShoppingGraph.next_event(&GraphState::Done, &StateUpdate::empty()), None);
    }

    #[test]
    fn invalid_transition_is_rejected() {
        let engine = GraphEngine::default();
        let error = engine
            .apply(&GraphState::Start, &GraphEvent::SearchCompleted)
            .expect_err("start cannot complete a search");

        assert_eq!(
            error,
            FlowTransitionError::InvalidTransition {
                state: GraphState::Start,
                event: GraphEvent::SearchCompleted
            }
        );
    }

    struct LoopingGraph;

    impl GraphDefinition for LoopingGraph {
        fn initial_state(&self) -> GraphState {
            GraphState::Start
        }

        fn next_event(&self, _: &GraphState, _: &StateUpdate) -> Option<GraphEvent> {
            Some(GraphEvent::Begin)
        }

        fn transition(
            &self,
            current: &GraphState,
            event: &GraphEvent,
        ) -> Result<TransitionOutcome, FlowTransitionError> {
            Ok(TransitionOutcome {
                from: *current,
                to: GraphState::Start,
                event: *event,
                actions: Vec::new(),
            })
        }
    }

    #[tokio::test]
    async fn cyclic_graph_hits_transition_budget() {
        let engine = GraphEngine::new(LoopingGraph).with_max_transitions(3);
        let runner = ScriptedRunner::new(StateUpdate::empty());

        let error = engine.run(entry_state("loop"), &runner).await.expect_err("must stop");
        assert_eq!(error, FlowTransitionError::TransitionBudgetExceeded { limit: 3 });
    }

    #[tokio::test]
    async fn replay_is_deterministic_for_same_input() {
        let engine = GraphEngine::default();
        let runner = ScriptedRunner::new(StateUpdate::with_filters(SearchFilters::new(
            "shoes",
            0.0,
            SortBy::PriceAsc,
        )));

        let first = engine.run(entry_state("cheap shoes"), &runner).await.expect("first run");
        let second = engine.run(entry_state("cheap shoes"), &runner).await.expect("second run");

        assert_eq!(first, second);
    }
}
