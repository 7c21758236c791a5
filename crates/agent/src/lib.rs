//! Agent runtime: intent routing, product search and turn orchestration.
//!
//! A turn flows through the shopping graph defined in `cartwise-core`:
//! 1. **Routing** (`router`) asks a [`Classifier`](classifier::Classifier)
//!    whether the latest message is chat or a product search, and extracts
//!    search filters when it is.
//! 2. **Search** (`search`) embeds the query, runs a price-filtered vector
//!    lookup against the [`ProductIndex`](index::ProductIndex) and renders
//!    the hits as one assistant message.
//! 3. **Orchestration** (`runtime`) drives the graph and merges each node's
//!    partial update into the conversation state.
//!
//! Routing failures propagate to the caller. Search failures are rendered
//! into the reply and never fail the turn.

pub mod classifier;
pub mod embedding;
pub mod errors;
pub mod hydrate;
pub mod index;
pub mod llm;
pub mod providers;
#[cfg(feature = "qdrant")]
pub mod qdrant;
pub mod router;
pub mod rules;
pub mod runtime;
pub mod search;

pub use errors::{AgentError, RoutingError, SearchError};
pub use runtime::AgentRuntime;
