use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphState {
    Start,
    Routed,
    Searched,
    Done,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphEvent {
    Begin,
    FiltersProduced,
    NoFiltersProduced,
    SearchCompleted,
}

/// A unit of work executed while entering the target state of a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphNode {
    Router,
    Search,
}

impl GraphNode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Router => "router",
            Self::Search => "search",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub from: GraphState,
    pub to: GraphState,
    pub event: GraphEvent,
    pub actions: Vec<GraphNode>,
}
