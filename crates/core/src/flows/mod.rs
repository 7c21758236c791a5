pub mod engine;
pub mod states;

pub use engine::{
    FlowTransitionError, GraphDefinition, GraphEngine, GraphRun, NodeRunner, ShoppingGraph,
};
pub use states::{GraphEvent, GraphNode, GraphState, TransitionOutcome};
