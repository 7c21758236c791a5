use cartwise_core::errors::ApplicationError;
use cartwise_core::flows::FlowTransitionError;
use thiserror::Error;

use crate::llm::LlmError;

/// Router failures. None of these are recovered inside a turn.
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("conversation history is empty; at least one message is required")]
    EmptyHistory,
    #[error("router output does not match the decision schema: {0}")]
    Schema(String),
    #[error("language backend failed: {0}")]
    Backend(#[from] LlmError),
}

/// Search backend failures. The search executor turns these into an
/// assistant-visible message, so they never escape a turn.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("embedding failed: {0}")]
    Embedding(String),
    #[error("product index failed: {0}")]
    Index(String),
    #[error("vector has {actual} dimensions but collection `{collection}` expects {expected}")]
    DimensionMismatch { collection: String, expected: usize, actual: usize },
    #[error("collection `{0}` does not exist")]
    CollectionMissing(String),
    #[error("invalid filter: {0}")]
    InvalidFilter(String),
}

/// What a conversation turn can fail with.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Routing(#[from] RoutingError),
    #[error(transparent)]
    Flow(#[from] FlowTransitionError),
}

impl AgentError {
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Routing(RoutingError::EmptyHistory) => "invalid_state",
            Self::Routing(RoutingError::Schema(_)) => "routing_schema",
            Self::Routing(RoutingError::Backend(_)) => "routing_backend",
            Self::Flow(_) => "flow",
        }
    }
}

impl From<AgentError> for ApplicationError {
    fn from(error: AgentError) -> Self {
        match error {
            AgentError::Routing(RoutingError::EmptyHistory) => {
                ApplicationError::InvalidState(RoutingError::EmptyHistory.to_string())
            }
            AgentError::Routing(other) => ApplicationError::Routing(other.to_string()),
            AgentError::Flow(flow) => ApplicationError::Flow(flow),
        }
    }
}
