pub mod config;
pub mod domain;
pub mod errors;
pub mod flows;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions};
pub use domain::conversation::{
    CartItem, ConversationState, Message, Role, SearchFilters, SortBy, StateUpdate,
};
pub use domain::product::{ProductId, ProductPayload, ProductRecord, SearchHit};
pub use domain::routing::{DecisionError, RouteAction, RouterDecision};
pub use errors::{ApplicationError, InterfaceError};
pub use flows::{GraphEngine, GraphNode, GraphRun, GraphState, NodeRunner, ShoppingGraph};
