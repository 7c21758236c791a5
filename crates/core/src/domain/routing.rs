use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::conversation::{null_as_default, Message, SearchFilters, StateUpdate};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteAction {
    Search,
    Chat,
}

impl RouteAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Chat => "chat",
        }
    }
}

/// The structured output the language backend is constrained to emit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouterDecision {
    pub action: RouteAction,
    #[serde(default, deserialize_with = "null_as_default")]
    pub search_params: SearchFilters,
    #[serde(default, alias = "response", deserialize_with = "null_as_default")]
    pub chat_reply: String,
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum DecisionError {
    #[error("extracted query contains a non-ASCII character: {0:?}")]
    NonAsciiQuery(String),
    #[error("extracted query contains a quote character: {0:?}")]
    QuotedQuery(String),
    #[error("max_price must be a finite, non-negative number, got {0}")]
    InvalidMaxPrice(f64),
}

impl RouterDecision {
    pub fn chat(reply: impl Into<String>) -> Self {
        Self {
            action: RouteAction::Chat,
            search_params: SearchFilters::default(),
            chat_reply: reply.into(),
        }
    }

    pub fn search(params: SearchFilters) -> Self {
        Self { action: RouteAction::Search, search_params: params, chat_reply: String::new() }
    }

    /// Checks the ASCII-safe, quote-free extraction contract.
    pub fn validate(&self) -> Result<(), DecisionError> {
        if self.action == RouteAction::Chat {
            return Ok(());
        }

        let query = &self.search_params.query;
        if !query.is_ascii() {
            return Err(DecisionError::NonAsciiQuery(query.clone()));
        }
        if query.contains(['"', '\'', '`']) {
            return Err(DecisionError::QuotedQuery(query.clone()));
        }

        let max_price = self.search_params.max_price;
        if !max_price.is_finite() || max_price < 0.0 {
            return Err(DecisionError::InvalidMaxPrice(max_price));
        }

        Ok(())
    }

    /// Search replaces the filters and appends nothing; chat appends exactly
    /// one assistant message and leaves the filters alone.
    pub fn into_update(self) -> StateUpdate {
        match self.action {
            RouteAction::Search => StateUpdate::with_filters(self.search_params),
            RouteAction::Chat => StateUpdate::with_message(Message::assistant(self.chat_reply)),
        }
    }
}
